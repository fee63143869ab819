//! Decoding of the remote judge-state body.
//!
//! The remote omits fields freely between revisions, so everything is read as
//! optional JSON first and normalized here. Missing numbers become zero and
//! missing containers become empty. A case status stays optional, since a case
//! listed without one has no verdict yet.

use super::RemoteCode;
use serde::Deserialize;
use serde_json::Value;

/// 远程判题状态 >= 2 表示测评结束
pub const JUDGE_FINISHED: i64 = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum JudgeState {
    /// 还没有任何结果
    NoContent,
    Progress {
        compile: Option<CompileInfo>,
        judge: Option<JudgeProgress>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompileInfo {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JudgeProgress {
    pub finished: bool,
    pub score: Option<u32>,
    pub time_ms: u64,
    pub memory_kb: u64,
    /// 远程明确给出的测试点总数
    pub total_cases: Option<usize>,
    pub subtasks: Vec<RemoteSubtask>,
}

impl JudgeProgress {
    pub fn listed_cases(&self) -> usize {
        self.subtasks.iter().map(|s| s.cases.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSubtask {
    pub id: i64,
    pub cases: Vec<RemoteCase>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCase {
    pub id: i64,
    pub status: Option<RemoteCode>,
    pub time_ms: u64,
    pub memory_kb: u64,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
#[error("无法解析测评结果: {0}")]
pub struct MalformedResponse(#[from] serde_json::Error);

#[derive(Deserialize, Default)]
struct RawBody {
    #[serde(default)]
    data: Option<RawData>,
}

#[derive(Deserialize, Default)]
struct RawData {
    #[serde(default)]
    compile: Option<RawCompile>,
    #[serde(default)]
    judge: Option<RawJudge>,
}

#[derive(Deserialize, Default)]
struct RawCompile {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawJudge {
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    score: Option<Value>,
    #[serde(default)]
    time: Option<Value>,
    #[serde(default)]
    memory: Option<Value>,
    #[serde(default, alias = "caseCount")]
    total: Option<Value>,
    #[serde(default)]
    subtasks: Option<Vec<RawSubtask>>,
}

#[derive(Deserialize, Default)]
struct RawSubtask {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    cases: Option<Vec<RawCase>>,
}

#[derive(Deserialize, Default)]
struct RawCase {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    time: Option<Value>,
    #[serde(default)]
    memory: Option<Value>,
    #[serde(default)]
    description: Option<Value>,
}

/// 数字字段可能是整数, 浮点数或字符串
fn number(v: &Option<Value>) -> Option<f64> {
    match v.as_ref()? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn unsigned(v: &Option<Value>) -> u64 {
    number(v).filter(|n| *n > 0.0).map(|n| n as u64).unwrap_or(0)
}

fn id(v: &Option<Value>) -> i64 {
    number(v).map(|n| n as i64).unwrap_or(0)
}

fn code(v: Option<Value>) -> Option<RemoteCode> {
    match v? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(RemoteCode::Int),
        Value::String(s) => Some(RemoteCode::Text(s)),
        _ => None,
    }
}

pub fn decode_judge_state(body: &str) -> Result<JudgeState, MalformedResponse> {
    if body.trim().is_empty() {
        return Ok(JudgeState::NoContent);
    }
    let raw = serde_json::from_str::<RawBody>(body)?;
    let Some(data) = raw.data else {
        return Ok(JudgeState::NoContent);
    };

    let compile = data.compile.map(|c| CompileInfo {
        success: c.success != Some(false),
        message: c.message.unwrap_or_default(),
    });

    let judge = data.judge.map(|j| JudgeProgress {
        finished: id(&j.status) >= JUDGE_FINISHED,
        score: number(&j.score).map(|n| n.max(0.0) as u32),
        time_ms: unsigned(&j.time),
        memory_kb: unsigned(&j.memory),
        total_cases: number(&j.total).filter(|n| *n > 0.0).map(|n| n as usize),
        subtasks: j
            .subtasks
            .unwrap_or_default()
            .into_iter()
            .map(|s| RemoteSubtask {
                id: id(&s.id),
                cases: s
                    .cases
                    .unwrap_or_default()
                    .into_iter()
                    .map(|c| RemoteCase {
                        id: id(&c.id),
                        status: code(c.status),
                        time_ms: unsigned(&c.time),
                        memory_kb: unsigned(&c.memory),
                        message: match c.description {
                            Some(Value::String(s)) => s,
                            Some(Value::Null) | None => String::new(),
                            Some(other) => other.to_string(),
                        },
                    })
                    .collect(),
            })
            .collect(),
    });

    Ok(JudgeState::Progress { compile, judge })
}
