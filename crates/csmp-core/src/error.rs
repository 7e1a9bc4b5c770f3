use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a whole encoder call, after client-side retries.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("encoder transport failure: {0}")]
    Transport(String),

    #[error("encoder deadline exceeded")]
    DeadlineExceeded,

    #[error("encoder rejected request: {0}")]
    Rejected(String),
}

impl EncodeError {
    /// Transient failures are retried; rejections never are.
    pub fn is_transient(&self) -> bool {
        matches!(self, EncodeError::Transport(_) | EncodeError::DeadlineExceeded)
    }
}
