/// 一次 HTTP 调用失败
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("请求远程测评失败: {0}")]
    Request(String),

    #[error("远程测评返回 {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError::Request(e.to_string())
    }
}

/// 提交阶段的错误, 出现时不会开始轮询
#[derive(Debug, Clone, thiserror::Error)]
pub enum SubmitError {
    #[error("代码过短: {len} < {min}")]
    CodeTooShort { len: usize, min: usize },

    #[error("不支持该语言: {0}")]
    UnsupportedLanguage(String),

    #[error("远程测评拒绝提交: {0}")]
    RemoteRejected(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
