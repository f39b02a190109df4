use thiserror::Error;

#[derive(Error, Debug)]
pub enum SteplineError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error (status {status}), not retrying")]
    ServerError { status: u16 },

    #[error("Gave up after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("Unexpected response status {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },
}

pub type Result<T> = std::result::Result<T, SteplineError>;
