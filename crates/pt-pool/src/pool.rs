//! `ResourcePool` — the exclusive-resource table and the eligibility map.

use std::collections::BTreeSet;

use pt_core::{ActivityId, CaseId, NameTable, ResourceId};
use pt_trace::TraceStore;

use crate::{PoolOverrides, Resource};

/// All resources of one twin configuration plus who may perform what.
///
/// Built from a [`TraceStore`]'s historical eligibility, optionally reshaped
/// by [`PoolOverrides`].  Eligible sets are kept sorted by `ResourceId` so a
/// seeded shuffle of the same set always yields the same order.
#[derive(Clone, Debug, Default)]
pub struct ResourcePool {
    names:     NameTable<ResourceId>,
    resources: Vec<Resource>,
    /// Indexed by `ActivityId`.  Empty set = no contention for the activity.
    eligible:  Vec<Vec<ResourceId>>,
}

impl ResourcePool {
    /// Build a pool for `store`, applying `overrides` if given.
    pub fn new(store: &TraceStore, overrides: Option<&PoolOverrides>) -> Self {
        let mut pool = Self::default();
        pool.configure(store, overrides);
        pool
    }

    /// Rebuild the resource table and eligibility map from scratch.
    ///
    /// Every resource seen in `store` becomes a capacity-1 resource; names
    /// that only appear in `overrides` are appended as new hires.  An
    /// override replaces the activity's historical set outright.  All
    /// runtime state and cumulative counters start from zero.
    pub fn configure(&mut self, store: &TraceStore, overrides: Option<&PoolOverrides>) {
        let mut names = store.resources().clone();
        if let Some(ov) = overrides {
            for (_, hires) in ov.iter() {
                for name in hires {
                    names.intern(name);
                }
            }
        }

        let mut eligible: Vec<Vec<ResourceId>> = (0..store.activities().len())
            .map(|i| {
                store
                    .activity_resources()
                    .get(&ActivityId(i as u32))
                    .map(|set| set.iter().copied().collect())
                    .unwrap_or_default()
            })
            .collect();

        if let Some(ov) = overrides {
            for (activity, replacement) in ov.iter() {
                let Some(act) = store.activities().get(activity) else {
                    log::warn!("override for unknown activity {activity:?} ignored");
                    continue;
                };
                let set: BTreeSet<ResourceId> = replacement
                    .iter()
                    .filter_map(|name| names.get(name))
                    .collect();
                log::debug!(
                    "override {activity:?}: {} -> {} eligible resources",
                    eligible[act.index()].len(),
                    set.len()
                );
                eligible[act.index()] = set.into_iter().collect();
            }
        }

        self.resources = names.iter().map(|(id, _)| Resource::new(id)).collect();
        self.names = names;
        self.eligible = eligible;
    }

    // ── Eligibility ───────────────────────────────────────────────────────

    /// Resources allowed to perform `activity`, ascending by id.  Unknown
    /// activities have none.
    pub fn eligible(&self, activity: ActivityId) -> &[ResourceId] {
        self.eligible
            .get(activity.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Names of the resources allowed to perform `activity`.
    pub fn eligible_names(&self, activity: ActivityId) -> Vec<&str> {
        self.eligible(activity)
            .iter()
            .filter_map(|&r| self.names.name(r))
            .collect()
    }

    pub fn resource_names(&self) -> &NameTable<ResourceId> {
        &self.names
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.resources[id.index()]
    }

    // ── Runtime state ─────────────────────────────────────────────────────

    #[inline]
    pub fn is_free(&self, id: ResourceId) -> bool {
        self.resources[id.index()].is_free()
    }

    pub fn try_acquire(&mut self, id: ResourceId, case: CaseId) -> bool {
        self.resources[id.index()].try_acquire(case)
    }

    pub fn enqueue(&mut self, id: ResourceId, case: CaseId) {
        self.resources[id.index()].enqueue(case);
    }

    /// Credit `worked_secs` to `id` and hand it to its next waiter, if any.
    pub fn release(&mut self, id: ResourceId, worked_secs: u64) -> Option<CaseId> {
        self.resources[id.index()].release(worked_secs)
    }

    /// Free every resource and zero every counter, keeping the mapping.
    pub fn reset_runtime(&mut self) {
        for r in &mut self.resources {
            r.reset();
        }
    }

    /// `(resource, busy seconds)` for every resource, in id order.
    pub fn busy_secs(&self) -> impl Iterator<Item = (ResourceId, u64)> + '_ {
        self.resources.iter().map(|r| (r.id, r.busy_secs()))
    }
}
