//! Trace types: raw `EventRow`s in, derived `Case`s and `Step`s out.

use pt_core::{ActivityId, CaseId, ResourceId};

// ── EventRow ──────────────────────────────────────────────────────────────────

/// One validated row of the event log.
///
/// Produced by the CSV loader after timestamp parsing; tests and other
/// front-ends can build these directly and hand them to
/// [`TraceStore::from_events`][crate::TraceStore::from_events].
#[derive(Clone, Debug, PartialEq)]
pub struct EventRow {
    pub case_id:   String,
    pub activity:  String,
    /// Absolute instant in Unix milliseconds.
    pub timestamp_ms: i64,
    /// Historical performer.  `None` when the log leaves it blank.
    pub resource:  Option<String>,
    pub value:     Option<f64>,
}

impl EventRow {
    /// Row at `unix_secs`, a whole second.
    pub fn new(case_id: &str, activity: &str, unix_secs: i64, resource: &str) -> Self {
        Self {
            case_id:      case_id.to_owned(),
            activity:     activity.to_owned(),
            timestamp_ms: unix_secs * 1_000,
            resource: (!resource.is_empty()).then(|| resource.to_owned()),
            value:    None,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

// ── Step ──────────────────────────────────────────────────────────────────────

/// One activity occurrence within a case.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub activity:      ActivityId,
    /// Seconds of work, already defaulted and clamped.
    pub duration_secs: u64,
    /// Who historically performed it.  Informational: the twin draws the
    /// actual performer from the activity's pool.
    pub resource:      Option<ResourceId>,
}

// ── Case ──────────────────────────────────────────────────────────────────────

/// One instance of the business process.  Immutable once derived.
#[derive(Clone, Debug, PartialEq)]
pub struct Case {
    pub id:                CaseId,
    /// Case identifier as written in the log.
    pub name:              String,
    /// Unix seconds of the first event.
    pub arrival_unix_secs: i64,
    /// Steps in original timestamp order.
    pub steps:             Vec<Step>,
    /// First monetary value recorded for the case, if any.
    pub value:             Option<f64>,
}

impl Case {
    /// Sum of all step durations, i.e. the cycle time without contention.
    pub fn work_secs(&self) -> u64 {
        self.steps.iter().map(|s| s.duration_secs).sum()
    }
}
