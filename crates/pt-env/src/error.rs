use pt_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("ticket pool is missing required column {0:?}")]
    MissingColumn(&'static str),

    #[error("expected {expected} actions (one per replica), got {got}")]
    ActionCount { expected: usize, got: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type EnvResult<T> = Result<T, EnvError>;
