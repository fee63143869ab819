use super::provider::{FetchResponse, SubmissionHandle, SubmitResponse, Transport};
use super::utils::request::{Credentials, RemoteJudgeRequest};
use super::{RemoteJudgeConfig, SubmitStyle, TransportError};
use async_trait::async_trait;
use reqwest::StatusCode;

pub const RESULT_PATH: &str = "/judge/result";
pub const QUOTA_PATH: &str = "/judge/quotaAvailable";

fn user_agent() -> String {
    format!("remote-judge/{}", env!("CARGO_PKG_VERSION"))
}

async fn into_body(resp: reqwest::Response) -> Result<(StatusCode, String), TransportError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok((status, body))
}

/// 洛谷开放平台, 使用 Basic 认证
pub struct LuoguTransport {
    req: RemoteJudgeRequest,
    style: SubmitStyle,
}

impl LuoguTransport {
    pub fn new(config: &RemoteJudgeConfig) -> anyhow::Result<Self> {
        let credentials = Credentials {
            username: config.account.handle.clone(),
            password: config.account.password.clone(),
        };
        Ok(Self {
            req: RemoteJudgeRequest::new(
                &config.base_url,
                &user_agent(),
                std::time::Duration::from_secs(config.request_timeout_secs),
                Some(credentials),
            )?,
            style: config.submit_style,
        })
    }
}

#[async_trait]
impl Transport for LuoguTransport {
    async fn post_submit(
        &self,
        path: &str,
        payload: &serde_json::Value,
    ) -> Result<SubmitResponse, TransportError> {
        let resp = match self.style {
            SubmitStyle::Api => self.req.post_json(path, payload).await?,
            SubmitStyle::Form => self.req.post(path, payload).await?,
        };
        let (status, body) = into_body(resp).await?;
        Ok(SubmitResponse {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_judge_state(
        &self,
        handle: &SubmissionHandle,
    ) -> Result<FetchResponse, TransportError> {
        let resp = self
            .req
            .get(&format!("{}?id={}", RESULT_PATH, handle))
            .await?;
        let (status, body) = into_body(resp).await?;
        if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
            return Ok(FetchResponse::no_content());
        }
        Ok(FetchResponse::content(body))
    }

    async fn fetch_quota(&self) -> Result<String, TransportError> {
        let resp = self.req.get(QUOTA_PATH).await?;
        Ok(into_body(resp).await?.1)
    }

    fn submit_style(&self) -> SubmitStyle {
        self.style
    }
}
