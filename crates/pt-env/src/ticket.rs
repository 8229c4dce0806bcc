//! Ticket pool loading and per-ticket feature derivation.
//!
//! # CSV format
//!
//! ```csv
//! Case_ID,Value,Priority,Activity,Domain
//! 4507000001_00010,1250.0,High,Record Invoice Receipt,Finance
//! 4507000002_00020,80.0,Low,Create Purchase Order Item,Procurement
//! ```
//!
//! | Column     | Aliases    | Required | Missing / malformed   |
//! |------------|------------|----------|-----------------------|
//! | `Case_ID`  | `Case ID`  | yes      | row dropped if empty  |
//! | `Value`    | `value`    | yes      | 0; negatives clamp to 0 |
//! | `Priority` |            | no       | label kept, unused    |
//! | `Activity` |            | no       | empty                 |
//! | `Domain`   |            | no       | "other" (code 0.5)    |
//!
//! If both a column and its alias are present, the canonical name is read.

use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use serde::Deserialize;

use crate::{EnvError, EnvResult};

// ── Pool ──────────────────────────────────────────────────────────────────────

/// One row of the ticket pool.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TicketRecord {
    #[serde(rename = "Case_ID")]
    pub id:       String,
    #[serde(rename = "Value", default, deserialize_with = "csv::invalid_option")]
    pub value:    Option<f64>,
    #[serde(rename = "Priority", default)]
    pub priority: Option<String>,
    #[serde(rename = "Activity", default)]
    pub activity: String,
    #[serde(rename = "Domain", default)]
    pub domain:   Option<String>,
}

impl TicketRecord {
    pub fn new(id: &str, value: f64) -> Self {
        Self {
            id:       id.to_owned(),
            value:    Some(value),
            priority: None,
            activity: String::new(),
            domain:   None,
        }
    }

    pub fn with_activity(mut self, activity: &str) -> Self {
        self.activity = activity.to_owned();
        self
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_owned());
        self
    }

    /// Monetary value with missing, non-finite and negative values mapped
    /// to zero.
    pub fn clean_value(&self) -> f64 {
        match self.value {
            Some(v) if v.is_finite() => v.max(0.0),
            _ => 0.0,
        }
    }
}

/// The full set of tickets an environment draws its backlog from.
///
/// Immutable after construction; environments share it through an `Arc`.
#[derive(Clone, Debug, Default)]
pub struct TicketPool {
    records:   Vec<TicketRecord>,
    max_value: f64,
}

impl TicketPool {
    pub fn from_records(records: Vec<TicketRecord>) -> Self {
        let max = records.iter().map(TicketRecord::clean_value).fold(0.0, f64::max);
        Self {
            records,
            max_value: if max > 0.0 { max } else { 1.0 },
        }
    }

    pub fn records(&self) -> &[TicketRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&TicketRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Normalisation constant: the largest value in the pool, or 1.0 when
    /// no ticket has a positive value.
    pub fn max_value(&self) -> f64 {
        self.max_value
    }
}

const ALIASED: [(&str, &[&str]); 2] = [
    ("Case_ID", &["Case_ID", "Case ID"]),
    ("Value", &["Value", "value"]),
];

/// Map the preferred header of each aliased column to its canonical name and
/// blank the rest, so every row deserializes one value per field.
fn canonical_headers(headers: &StringRecord) -> EnvResult<StringRecord> {
    let mut names: Vec<&str> = headers.iter().collect();
    for (canonical, accepted) in ALIASED {
        let chosen = accepted
            .iter()
            .find_map(|a| headers.iter().position(|h| h == *a))
            .ok_or(EnvError::MissingColumn(canonical))?;
        for (i, h) in headers.iter().enumerate() {
            if accepted.contains(&h) {
                names[i] = if i == chosen { canonical } else { "" };
            }
        }
    }
    Ok(StringRecord::from(names))
}

pub fn load_tickets_csv(path: &Path) -> EnvResult<TicketPool> {
    let file = std::fs::File::open(path)?;
    log::info!("loading ticket pool from {}", path.display());
    load_tickets_reader(file)
}

/// Like [`load_tickets_csv`] but from any `Read` source.
pub fn load_tickets_reader<R: Read>(reader: R) -> EnvResult<TicketPool> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = canonical_headers(csv_reader.headers()?)?;

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for result in csv_reader.records() {
        match result.and_then(|r| r.deserialize::<TicketRecord>(Some(&headers))) {
            Ok(r) if !r.id.is_empty() => records.push(r),
            Ok(_) => dropped += 1,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                log::debug!("dropping malformed ticket row: {e}");
                dropped += 1;
            }
        }
    }
    if dropped > 0 {
        log::warn!("dropped {dropped} malformed ticket rows");
    }

    let pool = TicketPool::from_records(records);
    log::info!("ticket pool: {} tickets, max value {:.2}", pool.len(), pool.max_value());
    Ok(pool)
}

// ── Features ──────────────────────────────────────────────────────────────────

/// Priority bucket 1..=5 from the normalised value.
pub fn priority_bucket(value: f64, max_value: f64) -> u8 {
    let bucket = (value / max_value * 5.0).floor() as i64 + 1;
    bucket.clamp(1, 5) as u8
}

/// Numeric code of a business domain.
pub fn domain_code(domain: Option<&str>) -> f32 {
    match domain {
        Some("Procurement") => 0.2,
        Some("Finance") => 0.4,
        Some("Logistics") => 0.6,
        Some("Quality") => 0.8,
        Some("Sales") => 1.0,
        _ => 0.5,
    }
}

/// A ticket in the backlog, with every feature fixed at creation time.
#[derive(Clone, Debug, PartialEq)]
pub struct Ticket {
    pub id:          String,
    pub activity:    String,
    pub value:       f64,
    pub priority:    u8,
    /// Synthetic hours waited, drawn uniformly once per ticket.
    pub wait_hours:  u32,
    /// Enriched features; all zero for the baseline variant.
    pub bottleneck:  f32,
    pub emb_mean:    f32,
    pub emb_std:     f32,
    pub emb_max:     f32,
    pub domain_code: f32,
}
