use super::provider::{SubmissionHandle, SubmissionRequest, Transport};
use super::utils::extract_submission_id_from_html;
use super::{LanguageResolver, SubmitError, TransportError};
use serde::{Deserialize, Serialize};
use simple_log::log::{debug, info};
use std::sync::Arc;

pub const DEFAULT_MIN_CODE_LENGTH: usize = 10;
pub const DEFAULT_SUBMIT_PATH: &str = "/judge/problem";

/// 远程提交接口的风格
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitStyle {
    /// JSON 接口, 返回体中带 `id` / `resultId` / `requestId`
    #[default]
    Api,
    /// 表单提交, 记录 id 嵌在返回的页面里
    Form,
}

/// 从应用层错误体中取出 `errorMessage`
pub fn error_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(body).ok()?;
    let message = value.get("errorMessage")?.as_str()?.trim();
    (!message.is_empty()).then(|| message.to_string())
}

impl SubmitStyle {
    pub fn decode_handle(self, body: &str) -> Result<SubmissionHandle, SubmitError> {
        match self {
            SubmitStyle::Api => {
                let value = serde_json::from_str::<serde_json::Value>(body).map_err(|_| {
                    SubmitError::RemoteRejected(format!("无法解析提交结果: {}", body))
                })?;
                let id = ["id", "resultId", "requestId"].iter().find_map(|key| {
                    match value.get(*key)? {
                        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
                        serde_json::Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    }
                });
                match id {
                    Some(id) => Ok(SubmissionHandle::new(id)),
                    None => Err(SubmitError::RemoteRejected(
                        error_message(body).unwrap_or_else(|| "提交结果中没有记录 id".into()),
                    )),
                }
            }
            SubmitStyle::Form => extract_submission_id_from_html(body)
                .map(SubmissionHandle::new)
                .ok_or_else(|| SubmitError::RemoteRejected("提交页面中没有记录 id".into())),
        }
    }
}

pub struct SubmissionClient<T: ?Sized> {
    transport: Arc<T>,
    resolver: LanguageResolver,
    min_code_length: usize,
    submit_path: String,
}

impl<T: Transport + ?Sized> SubmissionClient<T> {
    pub fn new(
        transport: Arc<T>,
        resolver: LanguageResolver,
        min_code_length: usize,
        submit_path: &str,
    ) -> Self {
        Self {
            transport,
            resolver,
            min_code_length,
            submit_path: submit_path.into(),
        }
    }

    /// 提交一次代码, 不做重试
    pub async fn submit(&self, req: &SubmissionRequest) -> Result<SubmissionHandle, SubmitError> {
        let len = req.code().chars().count();
        if len < self.min_code_length || req.code().trim().is_empty() {
            return Err(SubmitError::CodeTooShort {
                len,
                min: self.min_code_length,
            });
        }
        let lang = self.resolver.resolve(req.language_id())?;

        let payload = serde_json::json!({
            "pid": req.problem_id(),
            "code": req.code(),
            "lang": lang.code,
            "o2": lang.optimization || req.optimization(),
            "trackId": "1",
        });

        let resp = match self.transport.post_submit(&self.submit_path, &payload).await {
            Ok(resp) => resp,
            Err(TransportError::Status { status, body }) => {
                return Err(match error_message(&body) {
                    Some(message) => SubmitError::RemoteRejected(message),
                    None => TransportError::Status { status, body }.into(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        debug!("{}", resp.body);

        let handle = self.transport.submit_style().decode_handle(&resp.body)?;
        info!(
            "RecordID: {} problem: {} metadata: {}",
            handle,
            req.problem_id(),
            req.metadata()
        );
        Ok(handle)
    }
}
