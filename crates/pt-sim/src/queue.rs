//! `EventQueue` — the twin's future event list.
//!
//! Events live in a `BTreeMap<Tick, VecDeque<E>>`: the earliest tick pops
//! first, and events scheduled for the same tick pop in the order they were
//! pushed.  Both halves of that ordering are observable in the metrics, so
//! the queue is the single source of truth for "what happens next".
//!
//! Cost is O(log T) per push/pop where T is the number of distinct pending
//! ticks, which stays small (bounded by the number of in-flight cases).

use std::collections::{BTreeMap, VecDeque};

use pt_core::Tick;

/// Time-ordered FIFO event queue.
#[derive(Debug)]
pub struct EventQueue<E> {
    inner: BTreeMap<Tick, VecDeque<E>>,
    /// Cached total event count for O(1) `len()`.
    total: usize,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self { inner: BTreeMap::new(), total: 0 }
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` at `tick`, behind everything already due then.
    pub fn push(&mut self, tick: Tick, event: E) {
        self.inner.entry(tick).or_default().push_back(event);
        self.total += 1;
    }

    /// Remove and return the next due event.
    pub fn pop(&mut self) -> Option<(Tick, E)> {
        let mut slot = self.inner.first_entry()?;
        let tick = *slot.key();
        let event = slot.get_mut().pop_front();
        if slot.get().is_empty() {
            slot.remove();
        }
        let event = event?;
        self.total -= 1;
        Some((tick, event))
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
