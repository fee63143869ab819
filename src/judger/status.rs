use serde::{Deserialize, Serialize};
use simple_log::log::warn;
use std::collections::HashMap;
use std::fmt;

/// 本地测评结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultKind {
    /// 未知或保留的远程状态码, 只比 Accepted 好一点, 不会被当成通过
    #[default]
    Unknown,
    Waiting,
    Judging,
    CompileError,
    OutputLimitExceeded,
    MemoryLimitExceeded,
    TimeLimitExceeded,
    WrongAnswer,
    RuntimeError,
    SystemError,
    Accepted,
}

// 从好到坏, 不包含 Waiting 和 Judging
const SEVERITY: [ResultKind; 9] = [
    ResultKind::Accepted,
    ResultKind::Unknown,
    ResultKind::WrongAnswer,
    ResultKind::TimeLimitExceeded,
    ResultKind::MemoryLimitExceeded,
    ResultKind::OutputLimitExceeded,
    ResultKind::RuntimeError,
    ResultKind::CompileError,
    ResultKind::SystemError,
];

impl ResultKind {
    /// Rank in the worst-wins order, `None` while the case is still waiting or running.
    pub fn severity(self) -> Option<usize> {
        SEVERITY.iter().position(|&k| k == self)
    }

    pub fn is_final(self) -> bool {
        self.severity().is_some()
    }

    pub fn is_in_flight(self) -> bool {
        matches!(self, ResultKind::Waiting | ResultKind::Judging)
    }

    /// `true` when `self` is a verdict strictly worse than `other`.
    /// A non-final `other` is always replaced by a final `self`.
    pub fn is_worse_than(self, other: ResultKind) -> bool {
        match (self.severity(), other.severity()) {
            (Some(a), Some(b)) => a > b,
            (Some(_), None) => true,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResultKind::Unknown => "Unknown",
            ResultKind::Waiting => "Waiting",
            ResultKind::Judging => "Running",
            ResultKind::CompileError => "Compile Error",
            ResultKind::OutputLimitExceeded => "Output Limit Exceeded",
            ResultKind::MemoryLimitExceeded => "Memory Limit Exceeded",
            ResultKind::TimeLimitExceeded => "Time Limit Exceeded",
            ResultKind::WrongAnswer => "Wrong Answer",
            ResultKind::RuntimeError => "Runtime Error",
            ResultKind::SystemError => "System Error",
            ResultKind::Accepted => "Accepted",
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 远程状态码, 不同版本的接口有的给数字有的给字符串
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteCode {
    Int(i64),
    Text(String),
}

impl RemoteCode {
    pub fn key(&self) -> String {
        match self {
            RemoteCode::Int(n) => n.to_string(),
            RemoteCode::Text(s) => s.trim().to_string(),
        }
    }
}

impl fmt::Display for RemoteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

#[derive(Debug, Clone)]
pub struct StatusMapper {
    table: HashMap<String, ResultKind>,
}

impl StatusMapper {
    pub fn new(table: HashMap<String, ResultKind>) -> Self {
        Self { table }
    }

    pub fn map(&self, code: Option<&RemoteCode>) -> ResultKind {
        let Some(code) = code else {
            warn!("远程测评结果缺少状态码");
            return ResultKind::Unknown;
        };
        match self.table.get(&code.key()) {
            Some(&kind) => kind,
            None => {
                warn!("未知的远程状态码: {}", code);
                ResultKind::Unknown
            }
        }
    }
}

impl Default for StatusMapper {
    fn default() -> Self {
        Self::new(luogu_status_table())
    }
}

/// 洛谷开放平台的状态码表, 8 9 10 13 为保留值
pub fn luogu_status_table() -> HashMap<String, ResultKind> {
    vec![
        (0, ResultKind::Waiting),
        (1, ResultKind::Judging),
        (2, ResultKind::CompileError),
        (3, ResultKind::OutputLimitExceeded),
        (4, ResultKind::MemoryLimitExceeded),
        (5, ResultKind::TimeLimitExceeded),
        (6, ResultKind::WrongAnswer),
        (7, ResultKind::RuntimeError),
        (11, ResultKind::SystemError),
        (12, ResultKind::Accepted),
        (14, ResultKind::WrongAnswer),
    ]
    .into_iter()
    .map(|(code, kind)| (code.to_string(), kind))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luogu_codes() {
        let mapper = StatusMapper::default();
        assert_eq!(mapper.map(Some(&RemoteCode::Int(12))), ResultKind::Accepted);
        assert_eq!(mapper.map(Some(&RemoteCode::Int(6))), ResultKind::WrongAnswer);
        assert_eq!(mapper.map(Some(&RemoteCode::Int(14))), ResultKind::WrongAnswer);
        assert_eq!(
            mapper.map(Some(&RemoteCode::Text("5".into()))),
            ResultKind::TimeLimitExceeded
        );
    }

    #[test]
    fn test_reserved_and_missing_codes_are_unknown() {
        let mapper = StatusMapper::default();
        for code in [8, 9, 10, 13, 99, -1] {
            let kind = mapper.map(Some(&RemoteCode::Int(code)));
            assert_eq!(kind, ResultKind::Unknown);
            assert_ne!(kind, ResultKind::Accepted);
            assert!(kind.is_final());
            assert!(kind.is_worse_than(ResultKind::Accepted));
        }
        assert_eq!(mapper.map(None), ResultKind::Unknown);
    }

    #[test]
    fn test_severity_order() {
        assert!(ResultKind::WrongAnswer.is_worse_than(ResultKind::Accepted));
        assert!(ResultKind::SystemError.is_worse_than(ResultKind::CompileError));
        assert!(!ResultKind::Accepted.is_worse_than(ResultKind::RuntimeError));
        assert!(!ResultKind::WrongAnswer.is_worse_than(ResultKind::WrongAnswer));
        assert!(ResultKind::Unknown.is_worse_than(ResultKind::Accepted));
        assert!(ResultKind::WrongAnswer.is_worse_than(ResultKind::Unknown));
        assert!(!ResultKind::Judging.is_worse_than(ResultKind::Accepted));
        assert_eq!(ResultKind::Waiting.severity(), None);
    }

    #[test]
    fn test_table_from_config() {
        let table: HashMap<String, ResultKind> =
            serde_json::from_str(r#"{"AC": "ACCEPTED", "WA": "WRONG_ANSWER"}"#).unwrap();
        let mapper = StatusMapper::new(table);
        assert_eq!(
            mapper.map(Some(&RemoteCode::Text("AC".into()))),
            ResultKind::Accepted
        );
        assert_eq!(mapper.map(Some(&RemoteCode::Int(12))), ResultKind::Unknown);
    }
}
