use chrono::{DateTime, Utc};
use thiserror::Error;

/// ADM Client Error Types
#[derive(Error, Debug)]
pub enum ADMError {
    #[error("ADM configuration error: {0}")]
    Configuration(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("Failed to get access token: {0}")]
    TokenRequest(String),

    #[error("Token request failed with status: {status} - {body}")]
    TokenRequestFailed { status: u16, body: String },

    #[error("Failed to parse token response: {0}")]
    TokenParse(String),

    #[error("ADM send request failed: {0}")]
    SendRequest(String),

    #[error("Failed to parse ADM response: {0}")]
    ResponseParse(String),

    #[error("messages cannot be sent until {0}")]
    Suspended(DateTime<Utc>),

    #[error("Invalid Retry-After header: {0}")]
    InvalidRetryAfter(String),
}

impl From<ADMError> for String {
    fn from(err: ADMError) -> Self {
        err.to_string()
    }
}
