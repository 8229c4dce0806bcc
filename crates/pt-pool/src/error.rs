use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("override parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PoolResult<T> = Result<T, PoolError>;
