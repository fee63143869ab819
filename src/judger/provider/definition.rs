use crate::judger::ResultKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRequest {
    problem_id: String,
    code: String,
    language_id: String,
    optimization: bool,
    metadata: serde_json::Value,
}

impl SubmissionRequest {
    pub fn new(
        problem_id: impl Into<String>,
        code: impl Into<String>,
        language_id: impl Into<String>,
        optimization: bool,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            problem_id: problem_id.into(),
            code: code.into(),
            language_id: language_id.into(),
            optimization,
            metadata,
        }
    }

    pub fn problem_id(&self) -> &str {
        &self.problem_id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    pub fn optimization(&self) -> bool {
        self.optimization
    }

    pub fn metadata(&self) -> &serde_json::Value {
        &self.metadata
    }
}

/// 远程测评记录 id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionHandle(String);

impl SubmissionHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseResult {
    pub case_id: i64,
    pub subtask_id: i64,
    pub status: ResultKind,
    pub time_ms: u64,
    pub memory_kb: u64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtaskAggregate {
    pub subtask_id: i64,
    pub status: ResultKind,
    pub score: u32,
}

/// 一次提交的最终结果, 每次轮询只产生一个
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub status: ResultKind,
    pub score: u32,
    pub time_ms: u64,
    pub memory_kb: u64,
    pub subtasks: BTreeMap<i64, SubtaskAggregate>,
    pub compile_message: Option<String>,
}

impl SubmissionOutcome {
    pub fn system_error() -> Self {
        Self::failed(ResultKind::SystemError, None)
    }

    pub fn compile_error(message: String) -> Self {
        Self::failed(ResultKind::CompileError, Some(message))
    }

    fn failed(status: ResultKind, compile_message: Option<String>) -> Self {
        Self {
            status,
            score: 0,
            time_ms: 0,
            memory_kb: 0,
            subtasks: BTreeMap::new(),
            compile_message,
        }
    }
}

/// 增量进度, `progress` 为 `None` 表示总测试点数未知
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ResultKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cases: Vec<CaseResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler_text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SubmitResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub body: String,
    pub has_content: bool,
}

impl FetchResponse {
    pub fn no_content() -> Self {
        Self {
            body: String::new(),
            has_content: false,
        }
    }

    pub fn content(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            has_content: true,
        }
    }
}
