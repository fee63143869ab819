use super::{
    FetchResponse, ProgressUpdate, SubmissionHandle, SubmissionOutcome, SubmitResponse,
};
use crate::judger::{SubmitStyle, TransportError};
use async_trait::async_trait;

/// 与远程测评之间的 HTTP 调用, 连接池在所有会话之间共享
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_submit(
        &self,
        path: &str,
        payload: &serde_json::Value,
    ) -> Result<SubmitResponse, TransportError>;

    async fn get_judge_state(
        &self,
        handle: &SubmissionHandle,
    ) -> Result<FetchResponse, TransportError>;

    async fn fetch_quota(&self) -> Result<String, TransportError>;

    /// 提交接口返回体的格式
    fn submit_style(&self) -> SubmitStyle {
        SubmitStyle::Api
    }
}

/// 接收测评进度的一方.
/// `on_terminal` 每次轮询最多调用一次, 之后不会再有 `on_progress`.
#[async_trait]
pub trait ProgressSink: Send {
    async fn on_progress(&mut self, update: ProgressUpdate);

    async fn on_terminal(&mut self, outcome: SubmissionOutcome);
}
