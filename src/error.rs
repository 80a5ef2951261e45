use thiserror::Error;

/// Typed failure taxonomy returned by every core operation.
///
/// Callers get one of these variants, never an unstructured failure.
/// `Storage` wraps fatal persistence problems and is propagated unchanged so
/// the caller can retry with backoff; the core never retries on its own.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("authorization denied: {0}")]
    Authorization(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("payment gateway unavailable: {0}")]
    GatewayUnavailable(String),
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
