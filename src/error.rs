use std::io;

use thiserror::Error;

/// Failure of any store call. Callers treat every variant as a generic failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store returned status {0}")]
    Status(u16),

    #[error("not found")]
    NotFound,

    #[error("invalid request: {0}")]
    Invalid(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store worker disconnected")]
    Disconnected,
}

pub type StoreResult<T> = Result<T, StoreError>;
