//! The `OutputWriter` trait implemented by all backend writers.

use pt_sim::RunSummary;

use crate::{OutputResult, RunSummaryRow, StepEventRow};

/// Trait implemented by CSV, SQLite, and Parquet writers.
///
/// Errors surfacing through [`TwinOutputObserver`][crate::TwinOutputObserver]
/// are stored there and retrieved with `take_error`.
pub trait OutputWriter {
    /// Write a batch of finished steps.
    fn write_steps(&mut self, rows: &[StepEventRow]) -> OutputResult<()>;

    /// Write one labelled run summary row.
    fn write_run_summary(&mut self, row: &RunSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.  Writes after `finish` are silently dropped by backends
    /// that cannot reopen their files.
    fn finish(&mut self) -> OutputResult<()>;
}

/// Append `summary` to `writer` under `label`.
///
/// For callers that run the twin without an observer (scenario batches).
pub fn write_summary<W: OutputWriter + ?Sized>(
    writer:  &mut W,
    label:   &str,
    summary: &RunSummary,
) -> OutputResult<()> {
    writer.write_run_summary(&RunSummaryRow::from_summary(label, summary))
}
