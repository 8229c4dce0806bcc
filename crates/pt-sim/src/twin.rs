//! The `DigitalTwin` and its event loop.

use std::path::Path;
use std::sync::Arc;

use pt_core::{ResourceId, SimClock, SimRng, Tick, TwinConfig, secs_to_hours};
use pt_pool::{PoolOverrides, ResourcePool};
use pt_trace::{Case, TraceStore, load_or_empty};

use crate::{EventQueue, NoopObserver, RunSummary, SimResult, StepEvent, TwinObserver};

// ── DigitalTwin ───────────────────────────────────────────────────────────────

/// Replays the cases of a [`TraceStore`] against a constrained
/// [`ResourcePool`].
///
/// Per case the lifecycle is
///
/// ```text
/// Pending → Arrived → (per step: Requesting → Holding → Released) → Completed
/// ```
///
/// All cases are interleaved on a single virtual clock.  Time only moves when
/// the next event is popped from the [`EventQueue`]; nothing here reads the
/// wall clock.
///
/// The trace store is shared (`Arc`) so any number of twins, one per what-if
/// configuration, can replay the same cases.  Create via [`DigitalTwin::load`],
/// [`DigitalTwin::from_store`] or [`TwinBuilder`][crate::TwinBuilder].
#[derive(Debug)]
pub struct DigitalTwin {
    config:    TwinConfig,
    store:     Arc<TraceStore>,
    pool:      ResourcePool,
    overrides: Option<PoolOverrides>,
}

impl DigitalTwin {
    /// Load an event log and build a twin with the historical pool.
    ///
    /// A missing or unreadable log is not an error: it yields a twin with
    /// zero cases, whose runs report all-zero metrics.  Only an invalid
    /// `config` fails.
    pub fn load(path: &Path, config: TwinConfig) -> SimResult<Self> {
        config.validate()?;
        let store = load_or_empty(path, &config);
        Ok(Self::from_store(store, config))
    }

    /// Wrap an already derived store.  The pool starts from the store's
    /// historical eligibility.
    pub fn from_store(store: impl Into<Arc<TraceStore>>, config: TwinConfig) -> Self {
        let store = store.into();
        let pool = ResourcePool::new(&store, None);
        Self { config, store, pool, overrides: None }
    }

    /// Rebuild the resource pool, optionally replacing some activities'
    /// eligible sets.  Resets every cumulative metric.
    pub fn configure(&mut self, overrides: Option<&PoolOverrides>) {
        self.pool.configure(&self.store, overrides);
        self.overrides = overrides.cloned();
        log::debug!(
            "twin configured: {} resources, {} overridden activities",
            self.pool.resource_count(),
            overrides.map_or(0, PoolOverrides::len)
        );
    }

    /// Replay the earliest `max_cases` cases by arrival and report.
    pub fn run(&mut self, max_cases: usize) -> RunSummary {
        self.run_observed(max_cases, &mut NoopObserver)
    }

    /// [`run`][Self::run] with observer callbacks at every case transition.
    ///
    /// Every run starts from a fresh clock, freed resources with zeroed
    /// counters and an RNG reseeded from [`TwinConfig::seed`], so repeated
    /// runs with the same configuration report identical summaries.
    pub fn run_observed<O: TwinObserver>(&mut self, max_cases: usize, observer: &mut O) -> RunSummary {
        self.pool.reset_runtime();
        let selected: Vec<&Case> = self
            .store
            .cases_by_arrival()
            .into_iter()
            .take(max_cases)
            .collect();

        let run = Run::new(&self.store, &mut self.pool, observer, selected, &self.config);
        let summary = run.execute();
        log::info!(
            "twin run: {} cases, {:.2} h simulated, avg cycle {:.2} h, avg blocked {:.2} h",
            summary.cases,
            summary.total_duration_simulated_hours,
            summary.avg_cycle_time_hours,
            summary.avg_blocked_hours
        );
        summary
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &TwinConfig {
        &self.config
    }

    pub fn store(&self) -> &TraceStore {
        &self.store
    }

    pub fn shared_store(&self) -> Arc<TraceStore> {
        Arc::clone(&self.store)
    }

    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// The overrides applied by the last [`configure`][Self::configure].
    pub fn overrides(&self) -> Option<&PoolOverrides> {
        self.overrides.as_ref()
    }
}

// ── One run ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Event {
    /// The case's arrival delay has elapsed.
    Arrive(usize),
    /// The case's current step has held its resource for the full duration.
    Finish(usize),
}

/// Progress of one case through its steps.
struct Slot<'a> {
    case:         &'a Case,
    step:         usize,
    arrived:      Tick,
    requested:    Tick,
    started:      Tick,
    /// Resource held, or the one queued for until the grant.
    holding:      Option<ResourceId>,
    blocked_secs: u64,
}

#[derive(Default)]
struct Metrics {
    completed:             usize,
    cycle_secs:            u64,
    blocked_secs:          u64,
    value:                 f64,
    long_waits:            usize,
    /// Indexed by `ActivityId`.
    activity_blocked_secs: Vec<u64>,
    activity_steps:        Vec<u64>,
}

/// Mutable state of a single run.  Dropped when the run ends.
struct Run<'a, O> {
    store:    &'a TraceStore,
    pool:     &'a mut ResourcePool,
    observer: &'a mut O,
    clock:    SimClock,
    queue:    EventQueue<Event>,
    rng:      SimRng,
    slots:    Vec<Slot<'a>>,
    /// `CaseId` index → slot, `usize::MAX` for cases not in this run.
    slot_of:  Vec<usize>,
    metrics:  Metrics,
    long_wait_secs: u64,
}

impl<'a, O: TwinObserver> Run<'a, O> {
    fn new(
        store:    &'a TraceStore,
        pool:     &'a mut ResourcePool,
        observer: &'a mut O,
        selected: Vec<&'a Case>,
        config:   &TwinConfig,
    ) -> Self {
        let origin = selected.first().map_or(0, |c| c.arrival_unix_secs);
        let mut queue = EventQueue::new();
        let mut slot_of = vec![usize::MAX; store.case_count()];
        let mut slots = Vec::with_capacity(selected.len());

        for (i, case) in selected.into_iter().enumerate() {
            let delay = (case.arrival_unix_secs - origin).max(0) as u64;
            queue.push(Tick(delay), Event::Arrive(i));
            slot_of[case.id.index()] = i;
            slots.push(Slot {
                case,
                step:         0,
                arrived:      Tick::ZERO,
                requested:    Tick::ZERO,
                started:      Tick::ZERO,
                holding:      None,
                blocked_secs: 0,
            });
        }

        let activities = store.activities().len();
        Self {
            store,
            pool,
            observer,
            clock: SimClock::new(origin),
            queue,
            rng: SimRng::new(config.seed),
            slots,
            slot_of,
            metrics: Metrics {
                activity_blocked_secs: vec![0; activities],
                activity_steps: vec![0; activities],
                ..Metrics::default()
            },
            long_wait_secs: config.long_wait_secs,
        }
    }

    fn execute(mut self) -> RunSummary {
        self.observer.on_run_start(&self.clock, self.slots.len());
        while let Some((tick, event)) = self.queue.pop() {
            self.clock.advance_to(tick);
            match event {
                Event::Arrive(s) => self.arrive(s),
                Event::Finish(s) => self.finish(s),
            }
        }
        let summary = self.summarize();
        self.observer.on_run_end(&summary);
        summary
    }

    // ── Transitions ───────────────────────────────────────────────────────

    fn arrive(&mut self, s: usize) {
        let now = self.clock.now;
        self.slots[s].arrived = now;
        let case = self.slots[s].case;
        self.observer.on_case_arrived(now, case);
        self.request(s);
    }

    /// Ask for a resource for the case's current step, or complete the case
    /// if no steps remain.
    fn request(&mut self, s: usize) {
        let now = self.clock.now;
        let slot = &mut self.slots[s];
        let case = slot.case;
        let Some(step) = case.steps.get(slot.step).copied() else {
            self.complete(s);
            return;
        };
        slot.requested = now;

        let eligible = self.pool.eligible(step.activity);
        if eligible.is_empty() {
            self.start(s, None);
            return;
        }

        let mut candidates = eligible.to_vec();
        self.rng.shuffle(&mut candidates);
        match candidates.iter().copied().find(|&r| self.pool.is_free(r)) {
            Some(r) => {
                let acquired = self.pool.try_acquire(r, case.id);
                debug_assert!(acquired);
                self.start(s, Some(r));
            }
            None => {
                // Everyone busy: queue on the first shuffled candidate.
                let r = candidates[0];
                self.pool.enqueue(r, case.id);
                self.slots[s].holding = Some(r);
            }
        }
    }

    /// The step now holds `resource` (or needs none): book the wait and
    /// schedule the end of the hold.
    fn start(&mut self, s: usize, resource: Option<ResourceId>) {
        let now = self.clock.now;
        let slot = &mut self.slots[s];
        slot.holding = resource;
        slot.started = now;
        let waited = now.since(slot.requested);
        slot.blocked_secs += waited;
        let step = slot.case.steps[slot.step];

        self.metrics.blocked_secs += waited;
        if waited > self.long_wait_secs {
            self.metrics.long_waits += 1;
            log::debug!(
                "case {} waited {:.1} h for step {}",
                slot.case.name,
                secs_to_hours(waited),
                slot.step
            );
        }
        self.metrics.activity_blocked_secs[step.activity.index()] += waited;
        self.metrics.activity_steps[step.activity.index()] += 1;

        let event = step_event(self.store, self.pool, &self.slots[s]);
        self.observer.on_step_started(now, &event);
        self.queue.push(now + step.duration_secs, Event::Finish(s));
    }

    /// End of a hold: release unconditionally, hand the resource to the
    /// oldest waiter, then move the case on to its next step.
    fn finish(&mut self, s: usize) {
        let now = self.clock.now;
        let slot = &self.slots[s];
        let resource = slot.holding;
        let duration = slot.case.steps[slot.step].duration_secs;

        let event = step_event(self.store, self.pool, slot);
        self.observer.on_step_finished(now, &event);

        if let Some(r) = resource {
            if let Some(next) = self.pool.release(r, duration) {
                let waiter = self.slot_of[next.index()];
                self.start(waiter, Some(r));
            }
        }

        let slot = &mut self.slots[s];
        slot.holding = None;
        slot.step += 1;
        self.request(s);
    }

    fn complete(&mut self, s: usize) {
        let now = self.clock.now;
        let slot = &self.slots[s];
        let case = slot.case;
        let cycle = now.since(slot.arrived);
        let blocked = slot.blocked_secs;

        self.metrics.completed += 1;
        self.metrics.cycle_secs += cycle;
        self.metrics.value += case.value.filter(|v| v.is_finite()).unwrap_or(0.0);
        self.observer.on_case_completed(now, case, cycle, blocked);
    }

    // ── Reporting ─────────────────────────────────────────────────────────

    fn summarize(&self) -> RunSummary {
        let m = &self.metrics;
        if m.completed == 0 {
            return RunSummary::default();
        }
        let n = m.completed as f64;
        let sim_secs = self.clock.elapsed_secs();
        let sim_hours = secs_to_hours(sim_secs);

        let resource_utilization = self
            .pool
            .busy_secs()
            .filter_map(|(r, busy)| {
                let name = self.pool.resource_names().name(r)?;
                let share = if sim_secs > 0 { busy as f64 / sim_secs as f64 } else { 0.0 };
                Some((name.to_owned(), share))
            })
            .collect();

        let activity_blocked_hours = self
            .store
            .activities()
            .iter()
            .filter(|(a, _)| m.activity_steps[a.index()] > 0)
            .map(|(a, name)| (name.to_owned(), secs_to_hours(m.activity_blocked_secs[a.index()])))
            .collect();

        RunSummary {
            cases:                          m.completed,
            avg_cycle_time_hours:           secs_to_hours(m.cycle_secs) / n,
            avg_blocked_hours:              secs_to_hours(m.blocked_secs) / n,
            throughput_cases_per_hour:      if sim_hours > 0.0 { n / sim_hours } else { 0.0 },
            total_duration_simulated_hours: sim_hours,
            value_processed:                m.value,
            long_waits:                     m.long_waits,
            resource_utilization,
            activity_blocked_hours,
        }
    }
}

fn step_event<'x>(store: &'x TraceStore, pool: &'x ResourcePool, slot: &Slot<'x>) -> StepEvent<'x> {
    let step = slot.case.steps[slot.step];
    StepEvent {
        case:          slot.case,
        step_index:    slot.step,
        activity:      step.activity,
        activity_name: store.activities().name(step.activity).unwrap_or_default(),
        resource:      slot.holding,
        resource_name: slot.holding.and_then(|r| pool.resource_names().name(r)),
        requested:     slot.requested,
        started:       slot.started,
        duration_secs: step.duration_secs,
    }
}
