use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload must be a JSON object")]
    PayloadNotObject,

    #[error("unresolvable template code (dominant: {dominant:?}, second: {second:?})")]
    UnresolvedTemplateCode {
        dominant: Option<String>,
        second: Option<String>,
    },
}
