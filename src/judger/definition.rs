use super::language::{DEFAULT_NAMESPACE, DEFAULT_OPTIMIZATION_SUFFIX};
use super::submit::{DEFAULT_MIN_CODE_LENGTH, DEFAULT_SUBMIT_PATH};
use super::{PollConfig, QuotaConfig, ResultKind, ScorePolicy, SubmitStyle};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Account {
    pub handle: String,
    pub password: String,
    /// 形如 `score=100; ...`, 其中的 score 会覆盖通过时的分数
    #[serde(default)]
    pub cookie: Vec<String>,
}

impl Account {
    pub fn override_score(&self) -> Option<u32> {
        let cookie = self.cookie.first()?;
        let value = cookie.split("score=").nth(1)?.split(';').next()?;
        value.trim().parse::<u32>().ok().filter(|&s| s > 0)
    }
}

fn default_base_url() -> String {
    crate::global::remote_judge_constant::base_url::LUOGU.into()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.into()
}

fn default_suffix() -> String {
    DEFAULT_OPTIMIZATION_SUFFIX.into()
}

fn default_min_code_length() -> usize {
    DEFAULT_MIN_CODE_LENGTH
}

fn default_submit_path() -> String {
    DEFAULT_SUBMIT_PATH.into()
}

fn default_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteJudgeConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub account: Account,
    /// 不填时使用内置的语言表
    #[serde(default)]
    pub lang_map: Option<HashMap<String, String>>,
    #[serde(default = "default_namespace")]
    pub lang_namespace: String,
    #[serde(default = "default_suffix")]
    pub optimization_suffix: String,
    /// 不填时使用内置的状态码表
    #[serde(default)]
    pub status_map: Option<HashMap<String, ResultKind>>,
    #[serde(default = "default_min_code_length")]
    pub min_code_length: usize,
    #[serde(default)]
    pub submit_style: SubmitStyle,
    #[serde(default = "default_submit_path")]
    pub submit_path: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub score_policy: ScorePolicy,
    #[serde(default)]
    pub override_score: Option<u32>,
    #[serde(default)]
    pub quota: QuotaConfig,
}

impl RemoteJudgeConfig {
    /// 配置中的分数优先, 其次是账户 cookie 中的分数
    pub fn override_score(&self) -> Option<u32> {
        self.override_score.or_else(|| self.account.override_score())
    }
}
