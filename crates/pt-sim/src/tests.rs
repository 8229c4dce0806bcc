//! Tests for pt-sim.

use std::collections::BTreeMap;
use std::sync::Arc;

use pt_core::{CoreError, SimClock, Tick, TwinConfig};
use pt_pool::PoolOverrides;
use pt_trace::{Case, EventRow, TraceStore};

use crate::{
    DigitalTwin, EventQueue, NoopObserver, RunSummary, Scenario, SimError, StepEvent,
    TwinBuilder, TwinObserver, run_scenarios,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const HOUR: i64 = 3_600;
const LAST: u64 = 1_800;

fn store(rows: Vec<EventRow>) -> TraceStore {
    TraceStore::from_events(rows, &TwinConfig::default())
}

fn twin(rows: Vec<EventRow>) -> DigitalTwin {
    DigitalTwin::from_store(store(rows), TwinConfig::default())
}

/// `n` single-step cases of `activity`, all arriving at t = 0, historically
/// performed by `resource`.
fn simultaneous(n: usize, activity: &str, resource: &str) -> Vec<EventRow> {
    (0..n)
        .map(|i| EventRow::new(&format!("case_{i:02}"), activity, 0, resource))
        .collect()
}

/// Records per-step waits keyed by case name, plus hook counts.
#[derive(Default)]
struct Recorder {
    starts:     usize,
    arrivals:   Vec<String>,
    waits:      BTreeMap<String, Vec<u64>>,
    finished:   usize,
    completed:  Vec<(String, u64, u64)>,
    run_starts: usize,
    final_cases: Option<usize>,
    /// (resource name, start, end) of every resource hold.
    holds:      Vec<(String, u64, u64)>,
}

impl TwinObserver for Recorder {
    fn on_run_start(&mut self, _clock: &SimClock, _cases: usize) {
        self.run_starts += 1;
    }
    fn on_case_arrived(&mut self, _now: Tick, case: &Case) {
        self.arrivals.push(case.name.clone());
    }
    fn on_step_started(&mut self, now: Tick, step: &StepEvent<'_>) {
        assert_eq!(now, step.started);
        self.starts += 1;
        self.waits.entry(step.case.name.clone()).or_default().push(step.waited_secs());
        if let Some(name) = step.resource_name {
            self.holds.push((name.to_owned(), step.started.0, step.finished().0));
        }
    }
    fn on_step_finished(&mut self, now: Tick, step: &StepEvent<'_>) {
        assert_eq!(now, step.finished());
        self.finished += 1;
    }
    fn on_case_completed(&mut self, _now: Tick, case: &Case, cycle: u64, blocked: u64) {
        self.completed.push((case.name.clone(), cycle, blocked));
    }
    fn on_run_end(&mut self, summary: &RunSummary) {
        self.final_cases = Some(summary.cases);
    }
}

// ── EventQueue ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod queue {
    use super::*;

    #[test]
    fn pops_earliest_first() {
        let mut q = EventQueue::new();
        q.push(Tick(30), "c");
        q.push(Tick(10), "a");
        q.push(Tick(20), "b");
        assert_eq!(q.pop(), Some((Tick(10), "a")));
        assert_eq!(q.pop(), Some((Tick(20), "b")));
        assert_eq!(q.pop(), Some((Tick(30), "c")));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn equal_ticks_are_fifo() {
        let mut q = EventQueue::new();
        q.push(Tick(5), 1);
        q.push(Tick(5), 2);
        q.push(Tick(0), 0);
        q.push(Tick(5), 3);
        let order: Vec<i32> = std::iter::from_fn(|| q.pop()).map(|(_, e)| e).collect();
        assert_eq!(order, [0, 1, 2, 3]);
    }

    #[test]
    fn len_tracks_pushes_and_pops() {
        let mut q = EventQueue::new();
        assert!(q.is_empty());
        q.push(Tick(1), ());
        q.push(Tick(1), ());
        q.push(Tick(2), ());
        assert_eq!(q.len(), 3);
        q.pop();
        q.pop();
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop(), Some((Tick(2), ())));
        assert!(q.is_empty());
    }
}

// ── Scenarios from the contract ───────────────────────────────────────────────

#[cfg(test)]
mod contention {
    use super::*;

    #[test]
    fn single_case_on_one_resource() {
        let mut t = twin(vec![
            EventRow::new("c1", "a", 0, "R1"),
            EventRow::new("c1", "b", HOUR, "R1"),
            EventRow::new("c1", "c", 2 * HOUR, "R1"),
        ]);
        let s = t.run(1);
        let work = 3_600 + 3_600 + LAST;
        assert_eq!(s.cases, 1);
        assert_eq!(s.avg_cycle_time_hours, work as f64 / 3_600.0);
        assert_eq!(s.avg_blocked_hours, 0.0);
        assert_eq!(s.total_duration_simulated_hours, s.avg_cycle_time_hours);
        assert_eq!(s.utilization_of("R1"), 1.0);
        assert_eq!(s.throughput_cases_per_hour, 1.0 / s.total_duration_simulated_hours);
    }

    #[test]
    fn simultaneous_cases_queue_fifo_on_sole_resource() {
        let mut t = twin(simultaneous(2, "a", "R1"));
        let mut rec = Recorder::default();
        let s = t.run_observed(2, &mut rec);

        assert_eq!(rec.waits["case_00"], [0]);
        assert_eq!(rec.waits["case_01"], [LAST]);
        assert_eq!(s.avg_blocked_hours, 0.25);
        assert_eq!(s.avg_cycle_time_hours, 0.75);
        assert_eq!(s.total_duration_simulated_hours, 1.0);
        assert_eq!(s.utilization_of("R1"), 1.0);
    }

    #[test]
    fn waiters_are_served_in_arrival_order() {
        let mut t = twin(vec![
            EventRow::new("late", "a", 20, "R1"),
            EventRow::new("first", "a", 0, "R1"),
            EventRow::new("middle", "a", 10, "R1"),
        ]);
        let mut rec = Recorder::default();
        t.run_observed(3, &mut rec);
        assert_eq!(rec.arrivals, ["first", "middle", "late"]);
        assert_eq!(rec.waits["first"], [0]);
        assert_eq!(rec.waits["middle"], [LAST - 10]);
        assert_eq!(rec.waits["late"], [2 * LAST - 20]);
    }

    #[test]
    fn zero_eligible_activity_never_blocks() {
        let mut rows = simultaneous(6, "free_for_all", "");
        rows.push(EventRow::new("case_00", "busy", HOUR, "R1"));
        let mut t = twin(rows);
        let mut rec = Recorder::default();
        let s = t.run_observed(100, &mut rec);

        assert_eq!(s.cases, 6);
        assert_eq!(s.blocked_hours_for("free_for_all"), 0.0);
        assert!(s.activity_blocked_hours.contains_key("free_for_all"));
        assert!(rec.waits.values().flatten().all(|&w| w == 0));
    }

    #[test]
    fn resource_holds_never_overlap() {
        let mut rows = simultaneous(5, "a", "R1");
        rows.extend(simultaneous(5, "b", "R2").into_iter().map(|mut r| {
            r.case_id.push_str("_b");
            r
        }));
        rows.push(EventRow::new("case_00", "b", HOUR, "R2"));
        let mut t = twin(rows);
        let mut rec = Recorder::default();
        t.run_observed(100, &mut rec);

        for res in ["R1", "R2"] {
            let mut holds: Vec<_> = rec.holds.iter().filter(|h| h.0 == res).collect();
            holds.sort_by_key(|h| h.1);
            for pair in holds.windows(2) {
                assert!(pair[0].2 <= pair[1].1, "{res} double-booked: {pair:?}");
            }
        }
    }

    #[test]
    fn utilization_never_exceeds_one() {
        let mut rows = Vec::new();
        for i in 0..20_i64 {
            let case = format!("c{i}");
            let r = if i % 3 == 0 { "R1" } else { "R2" };
            rows.push(EventRow::new(&case, "intake", i * 600, r));
            rows.push(EventRow::new(&case, "approve", i * 600 + HOUR, "R1"));
            rows.push(EventRow::new(&case, "ship", i * 600 + 3 * HOUR, "R3"));
        }
        let s = twin(rows).run(20);
        assert_eq!(s.cases, 20);
        assert!(!s.resource_utilization.is_empty());
        for (r, u) in &s.resource_utilization {
            assert!((0.0..=1.0).contains(u), "{r} utilization {u}");
        }
        assert!(s.avg_blocked_hours > 0.0);
    }

    #[test]
    fn adding_capacity_does_not_increase_blocking() {
        let mut rows = simultaneous(4, "review", "A");
        rows.push(EventRow::new("other", "file", 0, "B"));
        let mut t = twin(rows);
        let before = t.run(10);

        t.configure(Some(&PoolOverrides::new().with("review", ["A", "B"])));
        let after = t.run(10);

        assert_eq!(before.blocked_hours_for("review"), 3.0);
        assert!(after.blocked_hours_for("review") < before.blocked_hours_for("review"));
        assert!(after.avg_blocked_hours <= before.avg_blocked_hours);
    }

    #[test]
    fn hired_resource_shows_in_utilization() {
        let mut t = twin(simultaneous(2, "review", "A"));
        t.configure(Some(&PoolOverrides::new().with("review", ["A", "new_hire"])));
        let s = t.run(2);
        assert_eq!(s.avg_blocked_hours, 0.0);
        assert!(s.resource_utilization.contains_key("new_hire"));
        assert_eq!(s.utilization_of("A") + s.utilization_of("new_hire"), 2.0);
    }
}

// ── Run semantics ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod runs {
    use super::*;

    fn busy_log() -> Vec<EventRow> {
        let mut rows = Vec::new();
        for i in 0..12_i64 {
            let case = format!("po{i}");
            rows.push(EventRow::new(&case, "create", i * 300, if i % 2 == 0 { "u1" } else { "u2" }));
            rows.push(EventRow::new(&case, "approve", i * 300 + 2 * HOUR, "u3"));
            rows.push(EventRow::new(&case, "approve", i * 300 + 2 * HOUR, "u2"));
            rows.push(EventRow::new(&case, "receive", i * 300 + 4 * HOUR, "u1"));
        }
        rows
    }

    #[test]
    fn repeated_runs_are_identical() {
        let mut t = twin(busy_log());
        t.configure(None);
        t.configure(None);
        let first = t.run(12);
        let second = t.run(12);
        assert_eq!(first, second);
        assert!(first.cases == 12);
    }

    #[test]
    fn same_seed_same_summary_across_twins() {
        let shared = Arc::new(store(busy_log()));
        let a = DigitalTwin::from_store(Arc::clone(&shared), TwinConfig::default()).run(12);
        let b = DigitalTwin::from_store(shared, TwinConfig::default()).run(12);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_cases_is_all_zero() {
        assert_eq!(twin(vec![]).run(100), RunSummary::default());
        assert_eq!(twin(busy_log()).run(0), RunSummary::default());
    }

    #[test]
    fn max_cases_takes_earliest_arrivals() {
        let mut t = twin(vec![
            EventRow::new("c", "a", 2 * HOUR, "R1"),
            EventRow::new("a", "a", 0, "R2"),
            EventRow::new("b", "a", HOUR, "R3"),
        ]);
        let mut rec = Recorder::default();
        let s = t.run_observed(2, &mut rec);
        assert_eq!(s.cases, 2);
        assert_eq!(rec.arrivals, ["a", "b"]);
    }

    #[test]
    fn arrival_delay_is_not_cycle_time() {
        let mut t = twin(vec![
            EventRow::new("early", "a", 0, "R1"),
            EventRow::new("late", "a", HOUR, "R2"),
        ]);
        let s = t.run(2);
        assert_eq!(s.avg_cycle_time_hours, 0.5);
        assert_eq!(s.total_duration_simulated_hours, 1.5);
    }

    #[test]
    fn every_hook_fires() {
        let mut t = twin(busy_log());
        let mut rec = Recorder::default();
        let s = t.run_observed(12, &mut rec);
        let steps = 12 * 4;
        assert_eq!(rec.run_starts, 1);
        assert_eq!(rec.arrivals.len(), 12);
        assert_eq!(rec.starts, steps);
        assert_eq!(rec.finished, steps);
        assert_eq!(rec.completed.len(), 12);
        assert_eq!(rec.final_cases, Some(s.cases));

        let total_blocked: u64 = rec.completed.iter().map(|c| c.2).sum();
        assert!((s.total_blocked_hours() - total_blocked as f64 / 3_600.0).abs() < 1e-9);
    }

    #[test]
    fn cycle_is_work_plus_blocking() {
        let st = store(busy_log());
        let work: BTreeMap<String, u64> =
            st.cases().iter().map(|c| (c.name.clone(), c.work_secs())).collect();
        let mut t = DigitalTwin::from_store(st, TwinConfig::default());
        let mut rec = Recorder::default();
        t.run_observed(12, &mut rec);
        for (name, cycle, blocked) in &rec.completed {
            assert_eq!(*cycle, work[name] + blocked, "case {name}");
        }
    }

    #[test]
    fn value_processed_sums_completed_cases() {
        let mut rows = simultaneous(3, "a", "R1");
        rows[0].value = Some(100.0);
        rows[1].value = Some(250.5);
        let s = twin(rows).run(3);
        assert_eq!(s.value_processed, 350.5);
        assert_eq!(twin(simultaneous(3, "a", "R1")).run(2).value_processed, 0.0);
    }

    #[test]
    fn long_waits_count_steps_over_the_threshold() {
        // Waits on the sole resource are 0, LAST and 2 * LAST.
        let config = TwinConfig { long_wait_secs: LAST, ..TwinConfig::default() };
        let mut t = DigitalTwin::from_store(store(simultaneous(3, "a", "R1")), config);
        assert_eq!(t.run(3).long_waits, 1);

        assert_eq!(twin(simultaneous(3, "a", "R1")).run(3).long_waits, 0);
    }

    #[test]
    fn noop_observer_matches_plain_run() {
        let mut t = twin(busy_log());
        let a = t.run(12);
        let b = t.run_observed(12, &mut NoopObserver);
        assert_eq!(a, b);
    }
}

// ── Construction ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod construction {
    use super::*;

    const CSV: &str = "\
Case_ID,Activity,Timestamp,Resource
c1,a,2018-01-01 08:00:00,R1
c1,b,2018-01-01 09:00:00,R1
c2,a,2018-01-01 08:00:00,R1
";

    #[test]
    fn load_from_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        std::fs::write(&path, CSV).unwrap();
        let mut t = DigitalTwin::load(&path, TwinConfig::default()).unwrap();
        assert_eq!(t.store().case_count(), 2);
        let s = t.run(10);
        assert_eq!(s.cases, 2);
        assert!(s.avg_blocked_hours > 0.0);
    }

    #[test]
    fn missing_log_degrades_to_empty() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        let mut t = DigitalTwin::load(&dir.path().join("absent.csv"), TwinConfig::default()).unwrap();
        assert_eq!(t.run(10), RunSummary::default());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let bad = TwinConfig { max_step_secs: 0, ..TwinConfig::default() };
        let err = TwinBuilder::new(TraceStore::empty()).config(bad.clone()).build().unwrap_err();
        assert!(matches!(err, SimError::Core(CoreError::Config(_))));
        let dir = tempfile::tempdir().unwrap();
        let err = DigitalTwin::load(&dir.path().join("x.csv"), bad).unwrap_err();
        assert!(matches!(err, SimError::Core(CoreError::Config(_))));
    }

    #[test]
    fn builder_applies_overrides_and_seed() {
        let t = TwinBuilder::new(store(simultaneous(2, "a", "R1")))
            .seed(7)
            .overrides(PoolOverrides::new().with("a", ["R1", "R9"]))
            .build()
            .unwrap();
        assert_eq!(t.config().seed, 7);
        let a = t.store().activities().get("a").unwrap();
        assert_eq!(t.pool().eligible_names(a), ["R1", "R9"]);
        assert!(t.overrides().is_some());
    }

    #[test]
    fn configure_none_restores_history() {
        let mut t = twin(simultaneous(2, "a", "R1"));
        t.configure(Some(&PoolOverrides::new().with("a", ["R2"])));
        t.configure(None);
        let a = t.store().activities().get("a").unwrap();
        assert_eq!(t.pool().eligible_names(a), ["R1"]);
        assert!(t.overrides().is_none());
    }
}

// ── Scenario batches ──────────────────────────────────────────────────────────

#[cfg(test)]
mod scenarios {
    use super::*;

    #[test]
    fn results_follow_input_order() {
        let shared = Arc::new(store(simultaneous(4, "review", "A")));
        let scenarios = [
            Scenario::baseline("baseline"),
            Scenario::with_overrides("hire", PoolOverrides::new().with("review", ["A", "B"])),
        ];
        let results = run_scenarios(&shared, &TwinConfig::default(), &scenarios, 10).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "baseline");
        assert_eq!(results[1].name, "hire");

        let direct = DigitalTwin::from_store(Arc::clone(&shared), TwinConfig::default()).run(10);
        assert_eq!(results[0].summary, direct);
        assert!(results[1].summary.avg_blocked_hours < results[0].summary.avg_blocked_hours);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let shared = Arc::new(TraceStore::empty());
        let scenarios = [Scenario::baseline("x"), Scenario::baseline("x")];
        let err = run_scenarios(&shared, &TwinConfig::default(), &scenarios, 1).unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }
}
