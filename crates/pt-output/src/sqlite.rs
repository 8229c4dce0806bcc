//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `step_events` and `run_summaries`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{OutputResult, RunSummaryRow, StepEventRow};

/// Writes twin output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS step_events (
                 case_id           TEXT    NOT NULL,
                 step_index        INTEGER NOT NULL,
                 activity          TEXT    NOT NULL,
                 resource          TEXT    NOT NULL,
                 requested_secs    INTEGER NOT NULL,
                 started_secs      INTEGER NOT NULL,
                 finished_secs     INTEGER NOT NULL,
                 waited_secs       INTEGER NOT NULL,
                 started_unix_secs INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS run_summaries (
                 label                          TEXT    NOT NULL,
                 cases                          INTEGER NOT NULL,
                 avg_cycle_time_hours           REAL    NOT NULL,
                 avg_blocked_hours              REAL    NOT NULL,
                 throughput_cases_per_hour      REAL    NOT NULL,
                 total_duration_simulated_hours REAL    NOT NULL,
                 value_processed                REAL    NOT NULL,
                 long_waits                     INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_steps(&mut self, rows: &[StepEventRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO step_events \
                 (case_id, step_index, activity, resource, requested_secs, \
                  started_secs, finished_secs, waited_secs, started_unix_secs) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.case_id,
                    row.step_index,
                    row.activity,
                    row.resource,
                    row.requested_secs as i64,
                    row.started_secs as i64,
                    row.finished_secs as i64,
                    row.waited_secs as i64,
                    row.started_unix_secs,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_run_summary(&mut self, row: &RunSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO run_summaries \
             (label, cases, avg_cycle_time_hours, avg_blocked_hours, \
              throughput_cases_per_hour, total_duration_simulated_hours, \
              value_processed, long_waits) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                row.label,
                row.cases as i64,
                row.avg_cycle_time_hours,
                row.avg_blocked_hours,
                row.throughput_cases_per_hour,
                row.total_duration_simulated_hours,
                row.value_processed,
                row.long_waits as i64,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
