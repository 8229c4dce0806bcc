//! `TwinOutputObserver<W>` — bridges `TwinObserver` to an `OutputWriter`.

use pt_core::{SimClock, Tick};
use pt_sim::{RunSummary, StepEvent, TwinObserver};

use crate::row::{RunSummaryRow, StepEventRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// Finished steps buffered before a batch write.
const BATCH_ROWS: usize = 1024;

/// A [`TwinObserver`] that records every finished step and the run summary to
/// any [`OutputWriter`] backend (CSV, SQLite, Parquet, …).
///
/// Errors from the writer are stored internally because `TwinObserver`
/// methods have no return value.  After `twin.run_observed()` returns, check
/// for errors with [`take_error`][Self::take_error].  The writer is finished
/// at the end of the run, so use one observer per run.
pub struct TwinOutputObserver<W: OutputWriter> {
    writer:          W,
    label:           String,
    clock:           SimClock,
    pending:         Vec<StepEventRow>,
    last_error:      Option<OutputError>,
}

impl<W: OutputWriter> TwinOutputObserver<W> {
    /// Create an observer backed by `writer`; the summary row is tagged `label`.
    pub fn new(writer: W, label: &str) -> Self {
        Self {
            writer,
            label:           label.to_owned(),
            clock:           SimClock::default(),
            pending:         Vec::with_capacity(BATCH_ROWS),
            last_error:      None,
        }
    }

    /// Take the stored write error (if any) after the run returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let result = self.writer.write_steps(&self.pending);
        self.pending.clear();
        self.store_err(result);
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            log::warn!("output write failed for run '{}': {e}", self.label);
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> TwinObserver for TwinOutputObserver<W> {
    fn on_run_start(&mut self, clock: &SimClock, _cases: usize) {
        self.clock = clock.clone();
    }

    fn on_step_finished(&mut self, _now: Tick, step: &StepEvent<'_>) {
        self.pending.push(StepEventRow::from_event(step, &self.clock));
        if self.pending.len() >= BATCH_ROWS {
            self.flush_pending();
        }
    }

    fn on_run_end(&mut self, summary: &RunSummary) {
        self.flush_pending();
        let row = RunSummaryRow::from_summary(&self.label, summary);
        let result = self.writer.write_run_summary(&row);
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }
}
