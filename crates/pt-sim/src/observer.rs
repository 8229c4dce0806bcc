//! Twin observer trait for progress reporting and data collection.

use pt_core::{ActivityId, ResourceId, SimClock, Tick};
use pt_trace::Case;

use crate::RunSummary;

/// One step occurrence as seen by observers.
///
/// Names are resolved by the twin so observers never need the name tables.
#[derive(Clone, Copy, Debug)]
pub struct StepEvent<'a> {
    pub case:          &'a Case,
    pub step_index:    usize,
    pub activity:      ActivityId,
    pub activity_name: &'a str,
    /// `None` when the activity has no eligible resources.
    pub resource:      Option<ResourceId>,
    pub resource_name: Option<&'a str>,
    /// When the case asked for a resource.
    pub requested:     Tick,
    /// When work actually began.
    pub started:       Tick,
    pub duration_secs: u64,
}

impl StepEvent<'_> {
    /// Seconds spent queueing for the resource.
    pub fn waited_secs(&self) -> u64 {
        self.started.since(self.requested)
    }

    pub fn finished(&self) -> Tick {
        self.started + self.duration_secs
    }
}

/// Callbacks invoked by [`DigitalTwin::run_observed`][crate::DigitalTwin::run_observed]
/// at each state transition of a case.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — completion counter
///
/// ```rust,ignore
/// struct Done(usize);
///
/// impl TwinObserver for Done {
///     fn on_case_completed(&mut self, _now: Tick, _case: &Case, _cycle: u64, _blocked: u64) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait TwinObserver {
    /// Called once before the first event.  `clock` maps ticks to Unix time.
    fn on_run_start(&mut self, _clock: &SimClock, _cases: usize) {}

    /// Called when a case's arrival delay has elapsed.
    fn on_case_arrived(&mut self, _now: Tick, _case: &Case) {}

    /// Called when a step acquires its resource (or bypasses contention).
    fn on_step_started(&mut self, _now: Tick, _step: &StepEvent<'_>) {}

    /// Called when a step's hold ends, before the resource is handed on.
    fn on_step_finished(&mut self, _now: Tick, _step: &StepEvent<'_>) {}

    /// Called after a case's last step.
    fn on_case_completed(&mut self, _now: Tick, _case: &Case, _cycle_secs: u64, _blocked_secs: u64) {}

    /// Called once after the event queue drains.
    fn on_run_end(&mut self, _summary: &RunSummary) {}
}

/// A [`TwinObserver`] that does nothing.
pub struct NoopObserver;

impl TwinObserver for NoopObserver {}
