//! `TraceStore` — the derived, immutable input of every twin run.
//!
//! Built once per event log and reused across any number of pool
//! configurations.  Holds the cases, the activity and resource name tables,
//! and the historical "who did what" eligibility map that the pool manager
//! uses as its default configuration.

use std::collections::{BTreeMap, BTreeSet};

use pt_core::{ActivityId, CaseId, NameTable, ResourceId, TwinConfig};

use crate::trace::{Case, EventRow, Step};

/// Cases derived from an event log plus the lookup tables they reference.
#[derive(Clone, Debug, Default)]
pub struct TraceStore {
    cases:              Vec<Case>,
    activities:         NameTable<ActivityId>,
    resources:          NameTable<ResourceId>,
    activity_resources: BTreeMap<ActivityId, BTreeSet<ResourceId>>,
    event_count:        usize,
    dropped_rows:       usize,
}

impl TraceStore {
    /// A store with zero cases.  Running a twin over it yields all-zero
    /// metrics.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Derive cases from validated event rows.
    ///
    /// Rows are grouped by case id (cases are numbered in ascending case-id
    /// order) and stably sorted by timestamp within each case, so events with
    /// equal timestamps keep their log order.
    pub fn from_events(rows: Vec<EventRow>, config: &TwinConfig) -> Self {
        let mut store = Self::empty();
        store.event_count = rows.len();

        let mut by_case: BTreeMap<String, Vec<EventRow>> = BTreeMap::new();
        for row in rows {
            by_case.entry(row.case_id.clone()).or_default().push(row);
        }

        store.cases.reserve(by_case.len());
        for (name, mut events) in by_case {
            events.sort_by_key(|e| e.timestamp_ms);

            let mut steps = Vec::with_capacity(events.len());
            for (i, event) in events.iter().enumerate() {
                let raw_secs = match events.get(i + 1) {
                    Some(next) => round_ms_to_secs(next.timestamp_ms - event.timestamp_ms),
                    None => config.last_step_secs,
                };
                let activity = store.activities.intern(&event.activity);
                let resource = event.resource.as_deref().map(|r| store.resources.intern(r));
                if let Some(r) = resource {
                    store.activity_resources.entry(activity).or_default().insert(r);
                } else {
                    store.activity_resources.entry(activity).or_default();
                }
                steps.push(Step {
                    activity,
                    duration_secs: raw_secs.min(config.max_step_secs),
                    resource,
                });
            }

            let id = CaseId(store.cases.len() as u32);
            store.cases.push(Case {
                id,
                arrival_unix_secs: events[0].timestamp_ms.div_euclid(1_000),
                value: events.iter().find_map(|e| e.value),
                name,
                steps,
            });
        }
        store
    }

    /// Record how many input rows the loader discarded.
    pub(crate) fn with_dropped_rows(mut self, dropped: usize) -> Self {
        self.dropped_rows = dropped;
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn case(&self, id: CaseId) -> Option<&Case> {
        self.cases.get(id.index())
    }

    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Number of rows that made it into a case.
    pub fn event_count(&self) -> usize {
        self.event_count
    }

    /// Number of rows the loader discarded (bad timestamp, malformed row).
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    pub fn activities(&self) -> &NameTable<ActivityId> {
        &self.activities
    }

    pub fn resources(&self) -> &NameTable<ResourceId> {
        &self.resources
    }

    /// Historical eligibility: every resource that performed each activity.
    /// Activities only ever seen without a resource map to an empty set.
    pub fn activity_resources(&self) -> &BTreeMap<ActivityId, BTreeSet<ResourceId>> {
        &self.activity_resources
    }

    /// Cases ordered by arrival, earliest first; ties broken by case id.
    pub fn cases_by_arrival(&self) -> Vec<&Case> {
        let mut ordered: Vec<&Case> = self.cases.iter().collect();
        ordered.sort_by_key(|c| (c.arrival_unix_secs, c.id));
        ordered
    }
}

/// Gap between two instants in whole seconds, rounded half up.  Negative gaps
/// count as zero.
fn round_ms_to_secs(gap_ms: i64) -> u64 {
    (gap_ms.max(0) as u64 + 500) / 1_000
}
