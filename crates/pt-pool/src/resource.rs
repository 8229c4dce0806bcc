//! A single worker identity with capacity exactly one.

use std::collections::VecDeque;

use pt_core::{CaseId, ResourceId};

/// Runtime state of one exclusive resource.
///
/// At most one case holds it at a time; everyone else waits in arrival order.
/// `release` hands the resource straight to the oldest waiter, so the
/// resource never sits idle while somebody is queued for it.
#[derive(Clone, Debug)]
pub struct Resource {
    pub id:     ResourceId,
    holder:     Option<CaseId>,
    waiters:    VecDeque<CaseId>,
    busy_secs:  u64,
}

impl Resource {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            holder: None,
            waiters: VecDeque::new(),
            busy_secs: 0,
        }
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.holder.is_none()
    }

    pub fn holder(&self) -> Option<CaseId> {
        self.holder
    }

    /// Cumulative seconds spent holding work since the last reset.
    pub fn busy_secs(&self) -> u64 {
        self.busy_secs
    }

    /// Take the resource if nobody holds it.  Returns whether it was taken.
    pub fn try_acquire(&mut self, case: CaseId) -> bool {
        if self.holder.is_some() {
            return false;
        }
        self.holder = Some(case);
        true
    }

    /// Join the FIFO queue behind every earlier request.
    pub fn enqueue(&mut self, case: CaseId) {
        self.waiters.push_back(case);
    }

    /// Finish `worked_secs` of work and pass the resource on.
    ///
    /// Returns the waiter that now holds it, if any.
    pub fn release(&mut self, worked_secs: u64) -> Option<CaseId> {
        debug_assert!(self.holder.is_some(), "release of a free resource {}", self.id);
        self.busy_secs += worked_secs;
        self.holder = self.waiters.pop_front();
        self.holder
    }

    /// Drop holder, waiters and counters.
    pub fn reset(&mut self) {
        self.holder = None;
        self.waiters.clear();
        self.busy_secs = 0;
    }
}
