//! Plain data row types written by output backends.

use pt_core::SimClock;
use pt_sim::{RunSummary, StepEvent};

/// One finished step of one case.
///
/// Times are simulated seconds since the earliest arrival; `started_unix_secs`
/// maps the start back onto the historical calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEventRow {
    pub case_id:           String,
    pub step_index:        u32,
    pub activity:          String,
    /// Empty when the activity had no eligible resources.
    pub resource:          String,
    pub requested_secs:    u64,
    pub started_secs:      u64,
    pub finished_secs:     u64,
    pub waited_secs:       u64,
    pub started_unix_secs: i64,
}

impl StepEventRow {
    pub fn from_event(step: &StepEvent<'_>, clock: &SimClock) -> Self {
        Self {
            case_id:           step.case.name.clone(),
            step_index:        step.step_index as u32,
            activity:          step.activity_name.to_owned(),
            resource:          step.resource_name.unwrap_or_default().to_owned(),
            requested_secs:    step.requested.0,
            started_secs:      step.started.0,
            finished_secs:     step.finished().0,
            waited_secs:       step.waited_secs(),
            started_unix_secs: clock.unix_secs_at(step.started),
        }
    }
}

/// The scalar part of a [`RunSummary`], tagged with a run label.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummaryRow {
    pub label:                          String,
    pub cases:                          u64,
    pub avg_cycle_time_hours:           f64,
    pub avg_blocked_hours:              f64,
    pub throughput_cases_per_hour:      f64,
    pub total_duration_simulated_hours: f64,
    pub value_processed:                f64,
    pub long_waits:                     u64,
}

impl RunSummaryRow {
    pub fn from_summary(label: &str, summary: &RunSummary) -> Self {
        Self {
            label:                          label.to_owned(),
            cases:                          summary.cases as u64,
            avg_cycle_time_hours:           summary.avg_cycle_time_hours,
            avg_blocked_hours:              summary.avg_blocked_hours,
            throughput_cases_per_hour:      summary.throughput_cases_per_hour,
            total_duration_simulated_hours: summary.total_duration_simulated_hours,
            value_processed:                summary.value_processed,
            long_waits:                     summary.long_waits as u64,
        }
    }
}
