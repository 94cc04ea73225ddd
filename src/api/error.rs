use serde_json::Value;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("network error: {0}")]
    Network(String),
    /// Non-2xx reply. `message` is the body's `message` field when present.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("not authorized to access fitness data")]
    NotAuthorized,
    #[error("LLM API key is not set")]
    MissingApiKey,
}
impl ApiError {
    /// Build the error for a failed reply, preferring the server's own message.
    pub fn from_status(status: u16, body: &Value) -> Self {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("HTTP error! Status: {status}"));
        ApiError::Status { status, message }
    }
}
impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            ApiError::Decode(value.to_string())
        } else {
            ApiError::Network(value.to_string())
        }
    }
}
impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::Decode(value.to_string())
    }
}
