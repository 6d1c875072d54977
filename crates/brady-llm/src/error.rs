use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Backend returned {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type LlmResult<T> = Result<T, LlmError>;
