//! Aggregate metrics of one twin run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What a [`DigitalTwin::run`][crate::DigitalTwin::run] reports.
///
/// All averages are per completed case.  A run over zero cases yields the
/// all-zero default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub cases:                          usize,
    pub avg_cycle_time_hours:           f64,
    pub avg_blocked_hours:              f64,
    pub throughput_cases_per_hour:      f64,
    pub total_duration_simulated_hours: f64,
    /// Sum of the monetary values of completed cases; cases without a value
    /// count as zero.
    #[serde(default)]
    pub value_processed:                f64,
    /// Steps that waited longer than [`TwinConfig::long_wait_secs`] for a
    /// resource.
    ///
    /// [`TwinConfig::long_wait_secs`]: pt_core::TwinConfig::long_wait_secs
    #[serde(default)]
    pub long_waits:                     usize,
    /// Resource name → busy seconds / simulated seconds, in `[0, 1]`.
    #[serde(default)]
    pub resource_utilization:           BTreeMap<String, f64>,
    /// Activity name → queueing hours summed over all its steps.
    #[serde(default)]
    pub activity_blocked_hours:         BTreeMap<String, f64>,
}

impl RunSummary {
    /// Total blocked hours across every case.
    pub fn total_blocked_hours(&self) -> f64 {
        self.avg_blocked_hours * self.cases as f64
    }

    /// Blocked hours recorded for `activity`, zero if it never ran.
    pub fn blocked_hours_for(&self, activity: &str) -> f64 {
        self.activity_blocked_hours.get(activity).copied().unwrap_or(0.0)
    }

    pub fn utilization_of(&self, resource: &str) -> f64 {
        self.resource_utilization.get(resource).copied().unwrap_or(0.0)
    }
}
