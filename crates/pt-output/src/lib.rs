//! `pt-output` — run output writers for the procure_twin digital twin.
//!
//! Three backends are provided behind Cargo features:
//!
//! | Feature   | Backend     | Files created                                   |
//! |-----------|-------------|-------------------------------------------------|
//! | *(none)*  | CSV         | `step_events.csv`, `run_summaries.csv`          |
//! | `sqlite`  | SQLite      | `output.db`                                     |
//! | `parquet` | Parquet     | `step_events.parquet`, `run_summaries.parquet`  |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`TwinOutputObserver`], which implements `pt_sim::TwinObserver`.
//! Summaries produced without an observer (scenario batches) go through
//! [`write_summary`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use pt_output::{CsvWriter, TwinOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = TwinOutputObserver::new(writer, "baseline");
//! twin.run_observed(1_000, &mut obs);
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::TwinOutputObserver;
pub use row::{RunSummaryRow, StepEventRow};
pub use writer::{OutputWriter, write_summary};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetWriter;
