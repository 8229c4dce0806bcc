//! Tests for pt-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::CsvWriter;
    use crate::row::{RunSummaryRow, StepEventRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn step_row(case: &str, index: u32, waited: u64) -> StepEventRow {
        StepEventRow {
            case_id:           case.to_owned(),
            step_index:        index,
            activity:          "Approve".to_owned(),
            resource:          "u1".to_owned(),
            requested_secs:    100,
            started_secs:      100 + waited,
            finished_secs:     1_900 + waited,
            waited_secs:       waited,
            started_unix_secs: 1_000 + waited as i64,
        }
    }

    fn summary_row(label: &str) -> RunSummaryRow {
        RunSummaryRow {
            label:                          label.to_owned(),
            cases:                          4,
            avg_cycle_time_hours:           1.5,
            avg_blocked_hours:              0.25,
            throughput_cases_per_hour:      2.0,
            total_duration_simulated_hours: 2.0,
            value_processed:                1_250.5,
            long_waits:                     1,
        }
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("step_events.csv").exists());
        assert!(dir.path().join("run_summaries.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("step_events.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(
            headers,
            [
                "case_id", "step_index", "activity", "resource", "requested_secs",
                "started_secs", "finished_secs", "waited_secs", "started_unix_secs",
            ]
        );

        let mut rdr2 = csv::Reader::from_path(dir.path().join("run_summaries.csv")).unwrap();
        let headers2: Vec<_> = rdr2.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers2[0], "label");
        assert_eq!(headers2.len(), 8);
        assert_eq!(&headers2[6..], ["value_processed", "long_waits"]);
    }

    #[test]
    fn csv_step_rows_written_in_order() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_steps(&[step_row("c1", 0, 0), step_row("c1", 1, 60), step_row("c2", 0, 0)]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("step_events.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[1][0], "c1");
        assert_eq!(&rows[1][1], "1");   // step_index
        assert_eq!(&rows[1][7], "60");  // waited_secs
        assert_eq!(&rows[2][0], "c2");
    }

    #[test]
    fn csv_summary_row_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_run_summary(&summary_row("baseline")).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("run_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "baseline");
        assert_eq!(&rows[0][1], "4");
        assert_eq!(&rows[0][2], "1.5");
        assert_eq!(&rows[0][6], "1250.5");
        assert_eq!(&rows[0][7], "1");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_empty_batch_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_steps(&[]).unwrap();
    }

    #[test]
    fn missing_dir_is_io_error() {
        let dir = tmp();
        let missing = dir.path().join("does").join("not").join("exist");
        assert!(CsvWriter::new(&missing).is_err());
    }
}

// ── Observer tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use pt_core::TwinConfig;
    use pt_sim::{DigitalTwin, RunSummary};
    use pt_trace::{EventRow, TraceStore};
    use tempfile::TempDir;

    use crate::row::{RunSummaryRow, StepEventRow};
    use crate::writer::{OutputWriter, write_summary};
    use crate::{CsvWriter, OutputResult, TwinOutputObserver};

    const T0: i64 = 1_700_000_000;

    /// Two single-step cases arriving together on the sole resource `u1`.
    fn contended_twin() -> DigitalTwin {
        let rows = vec![
            EventRow::new("c1", "Approve", T0, "u1"),
            EventRow::new("c2", "Approve", T0, "u1"),
        ];
        let store = TraceStore::from_events(rows, &TwinConfig::default());
        DigitalTwin::from_store(store, TwinConfig::default())
    }

    /// In-memory writer for observer tests.
    #[derive(Default)]
    struct MemWriter {
        steps:     Vec<StepEventRow>,
        summaries: Vec<RunSummaryRow>,
        batches:   usize,
        finishes:  usize,
    }

    impl OutputWriter for MemWriter {
        fn write_steps(&mut self, rows: &[StepEventRow]) -> OutputResult<()> {
            self.batches += 1;
            self.steps.extend_from_slice(rows);
            Ok(())
        }
        fn write_run_summary(&mut self, row: &RunSummaryRow) -> OutputResult<()> {
            self.summaries.push(row.clone());
            Ok(())
        }
        fn finish(&mut self) -> OutputResult<()> {
            self.finishes += 1;
            Ok(())
        }
    }

    /// Fails every write with an I/O error.
    struct BrokenWriter;

    impl OutputWriter for BrokenWriter {
        fn write_steps(&mut self, _rows: &[StepEventRow]) -> OutputResult<()> {
            Err(std::io::Error::other("disk full").into())
        }
        fn write_run_summary(&mut self, _row: &RunSummaryRow) -> OutputResult<()> {
            Err(std::io::Error::other("disk full").into())
        }
        fn finish(&mut self) -> OutputResult<()> {
            Ok(())
        }
    }

    #[test]
    fn observer_records_steps_and_summary() {
        let mut twin = contended_twin();
        let mut obs = TwinOutputObserver::new(MemWriter::default(), "baseline");
        let summary = twin.run_observed(10, &mut obs);
        assert!(obs.take_error().is_none());

        let w = obs.into_writer();
        assert_eq!(w.steps.len(), 2);
        assert_eq!(w.batches, 1, "steps are flushed in one batch at run end");
        assert_eq!(w.finishes, 1);

        let mut waits: Vec<u64> = w.steps.iter().map(|r| r.waited_secs).collect();
        waits.sort_unstable();
        assert_eq!(waits, [0, 1_800]);
        for row in &w.steps {
            assert_eq!(row.resource, "u1");
            assert_eq!(row.started_unix_secs, T0 + row.started_secs as i64);
            assert_eq!(row.finished_secs, row.started_secs + 1_800);
        }

        assert_eq!(w.summaries, [RunSummaryRow::from_summary("baseline", &summary)]);
        assert_eq!(w.summaries[0].cases, 2);
    }

    #[test]
    fn first_error_is_kept() {
        let mut twin = contended_twin();
        let mut obs = TwinOutputObserver::new(BrokenWriter, "broken");
        twin.run_observed(10, &mut obs);
        let err = obs.take_error().expect("write error stored");
        assert!(err.to_string().contains("disk full"));
        assert!(obs.take_error().is_none(), "error is taken only once");
    }

    #[test]
    fn integration_csv() {
        let dir: TempDir = tempfile::tempdir().expect("create temp dir");
        let mut twin = contended_twin();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = TwinOutputObserver::new(writer, "baseline");
        twin.run_observed(10, &mut obs);
        assert!(obs.take_error().is_none(), "no write errors expected");

        let mut rdr = csv::Reader::from_path(dir.path().join("step_events.csv")).unwrap();
        assert_eq!(rdr.records().count(), 2);
        let mut rdr = csv::Reader::from_path(dir.path().join("run_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "baseline");
        assert_eq!(&rows[0][1], "2");
    }

    #[test]
    fn write_summary_appends_labelled_rows() {
        let mut w = MemWriter::default();
        let summary = RunSummary { cases: 3, avg_cycle_time_hours: 2.0, ..RunSummary::default() };
        write_summary(&mut w, "baseline", &summary).unwrap();
        write_summary(&mut w, "hire", &RunSummary::default()).unwrap();
        let labels: Vec<&str> = w.summaries.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["baseline", "hire"]);
        assert_eq!(w.summaries[0].cases, 3);
        assert_eq!(w.summaries[0].avg_cycle_time_hours, 2.0);
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use crate::row::{RunSummaryRow, StepEventRow};
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn step_row(case: &str, resource: &str) -> StepEventRow {
        StepEventRow {
            case_id:           case.to_owned(),
            step_index:        0,
            activity:          "Approve".to_owned(),
            resource:          resource.to_owned(),
            requested_secs:    0,
            started_secs:      0,
            finished_secs:     1_800,
            waited_secs:       0,
            started_unix_secs: 0,
        }
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_step_count() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_steps(&[step_row("c1", "u1"), step_row("c2", "u1"), step_row("c3", "")]).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM step_events", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 3);
        let unassigned: i64 = conn
            .query_row("SELECT COUNT(*) FROM step_events WHERE resource = ''", [], |r| r.get(0))
            .unwrap();
        assert_eq!(unassigned, 1);
    }

    #[test]
    fn sqlite_summary_stored() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_run_summary(&RunSummaryRow {
            label:                          "hire".to_owned(),
            cases:                          7,
            avg_cycle_time_hours:           3.5,
            avg_blocked_hours:              0.5,
            throughput_cases_per_hour:      1.0,
            total_duration_simulated_hours: 7.0,
            value_processed:                900.0,
            long_waits:                     2,
        })
        .unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let (label, cases, long_waits): (String, i64, i64) = conn
            .query_row("SELECT label, cases, long_waits FROM run_summaries", [], |r| {
                Ok((r.get(0)?, r.get(1)?, r.get(2)?))
            })
            .unwrap();
        assert_eq!(label, "hire");
        assert_eq!(cases, 7);
        assert_eq!(long_waits, 2);
    }

    #[test]
    fn sqlite_finish_idempotent() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

// ── Parquet tests ─────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "parquet"))]
mod parquet_tests {
    use tempfile::TempDir;

    use arrow::datatypes::DataType;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    use crate::parquet::ParquetWriter;
    use crate::row::StepEventRow;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn parquet_files_created() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        assert!(dir.path().join("step_events.parquet").exists());
        assert!(dir.path().join("run_summaries.parquet").exists());
    }

    #[test]
    fn parquet_steps_readable() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        let rows: Vec<StepEventRow> = (0..4u32)
            .map(|i| StepEventRow {
                case_id:           format!("c{i}"),
                step_index:        0,
                activity:          "Approve".to_owned(),
                resource:          "u1".to_owned(),
                requested_secs:    0,
                started_secs:      u64::from(i) * 1_800,
                finished_secs:     u64::from(i + 1) * 1_800,
                waited_secs:       u64::from(i) * 1_800,
                started_unix_secs: 0,
            })
            .collect();
        w.write_steps(&rows).unwrap();
        w.finish().unwrap();

        let file = std::fs::File::open(dir.path().join("step_events.parquet")).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        let schema = builder.schema().clone();
        let reader = builder.build().unwrap();

        let total_rows: usize = reader.map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(total_rows, 4);

        let case_field = schema.field_with_name("case_id").unwrap();
        assert_eq!(*case_field.data_type(), DataType::Utf8);
    }

    #[test]
    fn parquet_writes_after_finish_are_dropped() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.write_steps(&[]).unwrap();
        w.finish().unwrap();
    }
}
