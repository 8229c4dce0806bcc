//! CSV event-log loader.
//!
//! # CSV format
//!
//! One row per event, header required.  Extra columns are ignored.
//!
//! ```csv
//! Case_ID,Activity,Timestamp,Resource,Value_EUR
//! 4507000001_00010,Create Purchase Order Item,2018-01-02 09:00:00,user_001,1250.0
//! 4507000001_00010,Record Goods Receipt,2018-01-04 11:30:00,user_014,
//! ```
//!
//! | Column      | Aliases               | Required |
//! |-------------|-----------------------|----------|
//! | `Case_ID`   | `Case ID`, `case_id`  | yes      |
//! | `Activity`  | `activity`            | yes      |
//! | `Timestamp` | `timestamp`           | yes      |
//! | `Resource`  | `resource`            | no       |
//! | `Value_EUR` | `Value`, `value`      | no       |
//!
//! When a file carries more than one accepted header for a column, the
//! leftmost entry of the table row wins and the others are ignored.
//!
//! Rows with an unparseable timestamp or a malformed field are dropped and
//! counted, never fatal.  Only a missing required column, an unreadable file
//! or a broken CSV stream fails the load; [`load_or_empty`] turns even those
//! into an empty store.

use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use serde::Deserialize;

use pt_core::TwinConfig;

use crate::timestamp::parse_timestamp_ms;
use crate::trace::EventRow;
use crate::{TraceError, TraceResult, TraceStore};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct EventRecord {
    #[serde(rename = "Case_ID")]
    case_id:   String,
    #[serde(rename = "Activity")]
    activity:  String,
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Resource", default)]
    resource:  Option<String>,
    #[serde(rename = "Value_EUR", default, deserialize_with = "csv::invalid_option")]
    value:     Option<f64>,
}

/// `(canonical name, accepted headers in order of preference, required)`.
const COLUMNS: [(&str, &[&str], bool); 5] = [
    ("Case_ID", &["Case_ID", "Case ID", "case_id"], true),
    ("Activity", &["Activity", "activity"], true),
    ("Timestamp", &["Timestamp", "timestamp"], true),
    ("Resource", &["Resource", "resource"], false),
    ("Value_EUR", &["Value_EUR", "Value", "value"], false),
];

/// Rewrite the header row so each column group maps to exactly one field.
///
/// The preferred header present in a group is renamed to the canonical name;
/// the group's other headers are blanked and ignored like any extra column.
fn canonical_headers(headers: &StringRecord) -> TraceResult<StringRecord> {
    let mut names: Vec<&str> = headers.iter().collect();
    for (canonical, accepted, required) in COLUMNS {
        let chosen = accepted
            .iter()
            .find_map(|a| headers.iter().position(|h| h == *a));
        if chosen.is_none() && required {
            return Err(TraceError::MissingColumn(canonical));
        }
        for (i, h) in headers.iter().enumerate() {
            if accepted.contains(&h) {
                names[i] = if Some(i) == chosen { canonical } else { "" };
            }
        }
    }
    Ok(StringRecord::from(names))
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load and derive a [`TraceStore`] from a CSV file.
pub fn load_event_log_csv(path: &Path, config: &TwinConfig) -> TraceResult<TraceStore> {
    let file = std::fs::File::open(path)?;
    log::info!("loading event log from {}", path.display());
    load_event_log_reader(file, config)
}

/// Like [`load_event_log_csv`] but accepts any `Read` source (pass a
/// `std::io::Cursor` in tests).
pub fn load_event_log_reader<R: Read>(reader: R, config: &TwinConfig) -> TraceResult<TraceStore> {
    config.validate()?;

    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = canonical_headers(csv_reader.headers()?)?;

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for result in csv_reader.records() {
        let record = match result.and_then(|r| r.deserialize::<EventRecord>(Some(&headers))) {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                log::debug!("dropping malformed event row: {e}");
                dropped += 1;
                continue;
            }
        };
        let Some(timestamp_ms) = parse_timestamp_ms(&record.timestamp) else {
            dropped += 1;
            continue;
        };
        if record.case_id.is_empty() || record.activity.is_empty() {
            dropped += 1;
            continue;
        }
        rows.push(EventRow {
            case_id: record.case_id,
            activity: record.activity,
            timestamp_ms,
            resource: record.resource.filter(|r| !r.is_empty()),
            value: record.value,
        });
    }

    if dropped > 0 {
        log::warn!("dropped {dropped} event rows with malformed timestamps or fields");
    }

    let store = TraceStore::from_events(rows, config).with_dropped_rows(dropped);
    log::info!(
        "prepared {} traces from {} events ({} activities, {} resources)",
        store.case_count(),
        store.event_count(),
        store.activities().len(),
        store.resources().len(),
    );
    Ok(store)
}

/// Lenient entry point: any load failure is logged and yields an empty store,
/// which simply simulates zero cases.
pub fn load_or_empty(path: &Path, config: &TwinConfig) -> TraceStore {
    match load_event_log_csv(path, config) {
        Ok(store) => store,
        Err(e) => {
            log::warn!("failed to load event log {}: {e}; continuing with no cases", path.display());
            TraceStore::empty()
        }
    }
}
