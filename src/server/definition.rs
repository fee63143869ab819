use crate::global::remote_judge_constant::names as remote_judge_names;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub ws_port: String,
    pub access_token: Option<String>,
}

fn default_remote_judge() -> String {
    remote_judge_names::LUOGU.into()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WsRequest {
    #[serde(default = "default_remote_judge")]
    pub remote_judge: String,
    pub request_type: String, // judge | quota

    pub lang: Option<String>,
    pub problem_id: Option<String>,
    pub source: Option<String>,
    #[serde(default)]
    pub o2: bool,
    /// 原样写进日志, 一般是本地测评记录 id
    #[serde(default)]
    pub metadata: serde_json::Value,
}
