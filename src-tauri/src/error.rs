use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodeliaError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Backend process error: {0}")]
    Sidecar(String),
}

impl From<CodeliaError> for String {
    fn from(err: CodeliaError) -> Self {
        err.to_string()
    }
}
