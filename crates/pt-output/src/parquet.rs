//! Parquet output backend (feature `parquet`).
//!
//! Creates two files in the configured output directory:
//! - `step_events.parquet`
//! - `run_summaries.parquet`

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Builder, Int64Builder, StringBuilder, UInt32Builder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::OutputWriter;
use crate::{OutputResult, RunSummaryRow, StepEventRow};

fn step_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("case_id",           DataType::Utf8,   false),
        Field::new("step_index",        DataType::UInt32, false),
        Field::new("activity",          DataType::Utf8,   false),
        Field::new("resource",          DataType::Utf8,   false),
        Field::new("requested_secs",    DataType::UInt64, false),
        Field::new("started_secs",      DataType::UInt64, false),
        Field::new("finished_secs",     DataType::UInt64, false),
        Field::new("waited_secs",       DataType::UInt64, false),
        Field::new("started_unix_secs", DataType::Int64,  false),
    ]))
}

fn summary_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("label",                          DataType::Utf8,    false),
        Field::new("cases",                          DataType::UInt64,  false),
        Field::new("avg_cycle_time_hours",           DataType::Float64, false),
        Field::new("avg_blocked_hours",              DataType::Float64, false),
        Field::new("throughput_cases_per_hour",      DataType::Float64, false),
        Field::new("total_duration_simulated_hours", DataType::Float64, false),
        Field::new("value_processed",                DataType::Float64, false),
        Field::new("long_waits",                     DataType::UInt64,  false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Writes twin output to two Parquet files.
///
/// `finish()` **must** be called to write the Parquet file footer; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    steps:       Option<ArrowWriter<File>>,
    summaries:   Option<ArrowWriter<File>>,
    step_schema: Arc<Schema>,
    summ_schema: Arc<Schema>,
}

impl ParquetWriter {
    /// Create both Parquet files in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let step_schema = step_schema();
        let summ_schema = summary_schema();

        let step_file = File::create(dir.join("step_events.parquet"))?;
        let steps = ArrowWriter::try_new(step_file, Arc::clone(&step_schema), Some(snappy_props()))?;

        let summ_file = File::create(dir.join("run_summaries.parquet"))?;
        let summaries = ArrowWriter::try_new(summ_file, Arc::clone(&summ_schema), Some(snappy_props()))?;

        Ok(Self {
            steps: Some(steps),
            summaries: Some(summaries),
            step_schema,
            summ_schema,
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_steps(&mut self, rows: &[StepEventRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.steps.as_mut() else {
            return Ok(());
        };

        let mut case_ids     = StringBuilder::new();
        let mut step_indices = UInt32Builder::new();
        let mut activities   = StringBuilder::new();
        let mut resources    = StringBuilder::new();
        let mut requested    = UInt64Builder::new();
        let mut started      = UInt64Builder::new();
        let mut finished     = UInt64Builder::new();
        let mut waited       = UInt64Builder::new();
        let mut started_unix = Int64Builder::new();

        for row in rows {
            case_ids.append_value(&row.case_id);
            step_indices.append_value(row.step_index);
            activities.append_value(&row.activity);
            resources.append_value(&row.resource);
            requested.append_value(row.requested_secs);
            started.append_value(row.started_secs);
            finished.append_value(row.finished_secs);
            waited.append_value(row.waited_secs);
            started_unix.append_value(row.started_unix_secs);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.step_schema),
            vec![
                Arc::new(case_ids.finish()),
                Arc::new(step_indices.finish()),
                Arc::new(activities.finish()),
                Arc::new(resources.finish()),
                Arc::new(requested.finish()),
                Arc::new(started.finish()),
                Arc::new(finished.finish()),
                Arc::new(waited.finish()),
                Arc::new(started_unix.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_run_summary(&mut self, row: &RunSummaryRow) -> OutputResult<()> {
        let Some(writer) = self.summaries.as_mut() else {
            return Ok(());
        };

        let mut labels     = StringBuilder::new();
        let mut cases      = UInt64Builder::new();
        let mut cycle      = Float64Builder::new();
        let mut blocked    = Float64Builder::new();
        let mut throughput = Float64Builder::new();
        let mut duration   = Float64Builder::new();
        let mut value      = Float64Builder::new();
        let mut long_waits = UInt64Builder::new();

        labels.append_value(&row.label);
        cases.append_value(row.cases);
        cycle.append_value(row.avg_cycle_time_hours);
        blocked.append_value(row.avg_blocked_hours);
        throughput.append_value(row.throughput_cases_per_hour);
        duration.append_value(row.total_duration_simulated_hours);
        value.append_value(row.value_processed);
        long_waits.append_value(row.long_waits);

        let batch = RecordBatch::try_new(
            Arc::clone(&self.summ_schema),
            vec![
                Arc::new(labels.finish()),
                Arc::new(cases.finish()),
                Arc::new(cycle.finish()),
                Arc::new(blocked.finish()),
                Arc::new(throughput.finish()),
                Arc::new(duration.finish()),
                Arc::new(value.finish()),
                Arc::new(long_waits.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.steps.take() {
            w.close()?;
        }
        if let Some(w) = self.summaries.take() {
            w.close()?;
        }
        Ok(())
    }
}
