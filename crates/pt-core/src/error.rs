//! Base error type.
//!
//! Sub-crates wrap `CoreError` as one variant of their own error enums.

use thiserror::Error;

/// Errors raised by `pt-core` itself.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `pt-core`.
pub type CoreResult<T> = Result<T, CoreError>;
