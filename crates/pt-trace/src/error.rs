use pt_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("event log is missing required column {0:?}")]
    MissingColumn(&'static str),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type TraceResult<T> = Result<T, TraceError>;
