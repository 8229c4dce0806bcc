//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `step_events.csv`
//! - `run_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{OutputResult, RunSummaryRow, StepEventRow};

/// Writes twin output to two CSV files.
pub struct CsvWriter {
    steps:     Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut steps = Writer::from_path(dir.join("step_events.csv"))?;
        steps.write_record([
            "case_id",
            "step_index",
            "activity",
            "resource",
            "requested_secs",
            "started_secs",
            "finished_secs",
            "waited_secs",
            "started_unix_secs",
        ])?;

        let mut summaries = Writer::from_path(dir.join("run_summaries.csv"))?;
        summaries.write_record([
            "label",
            "cases",
            "avg_cycle_time_hours",
            "avg_blocked_hours",
            "throughput_cases_per_hour",
            "total_duration_simulated_hours",
            "value_processed",
            "long_waits",
        ])?;

        Ok(Self { steps, summaries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_steps(&mut self, rows: &[StepEventRow]) -> OutputResult<()> {
        for row in rows {
            self.steps.write_record(&[
                row.case_id.clone(),
                row.step_index.to_string(),
                row.activity.clone(),
                row.resource.clone(),
                row.requested_secs.to_string(),
                row.started_secs.to_string(),
                row.finished_secs.to_string(),
                row.waited_secs.to_string(),
                row.started_unix_secs.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_run_summary(&mut self, row: &RunSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.label.clone(),
            row.cases.to_string(),
            row.avg_cycle_time_hours.to_string(),
            row.avg_blocked_hours.to_string(),
            row.throughput_cases_per_hour.to_string(),
            row.total_duration_simulated_hours.to_string(),
            row.value_processed.to_string(),
            row.long_waits.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.steps.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
