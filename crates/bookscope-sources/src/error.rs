use bookscope_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error from {0}: {1}")]
    Api(String, String),

    #[error("rate limit from {0}, retry after {1}s")]
    RateLimit(String, u64),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("malformed record: {0}")]
    Malformed(#[from] CoreError),

    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

impl SourceError {
    /// Defects in upstream data, as opposed to transient availability problems.
    pub fn is_defect(&self) -> bool {
        matches!(self, SourceError::Malformed(_) | SourceError::Parse(_))
    }
}

pub type Result<T> = std::result::Result<T, SourceError>;
