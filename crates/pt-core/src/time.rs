//! Simulation time model.
//!
//! # Design
//!
//! Virtual time is a monotonically increasing `Tick` counter where one tick is
//! one simulated second.  Event-log timestamps have whole-second resolution in
//! practice, so integer seconds keep all scheduling arithmetic exact (no
//! floating-point drift) and make equal-time comparisons meaningful, which the
//! FIFO tie-break of the event queue relies on.
//!
//! Reporting converts to hours only at the very end via [`secs_to_hours`].

use std::fmt;

/// Seconds per simulated hour.
pub const SECS_PER_HOUR: u64 = 3_600;

/// Convert a second count to fractional hours for reporting.
#[inline]
pub fn secs_to_hours(secs: u64) -> f64 {
    secs as f64 / SECS_PER_HOUR as f64
}

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation time in seconds since the start of a run.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` seconds after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Seconds elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0 - earlier.0
    }

    #[inline]
    pub fn as_hours(self) -> f64 {
        secs_to_hours(self.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The virtual clock of one simulation run.
///
/// Holds the Unix timestamp of tick 0 (the earliest case arrival) so
/// observers can map ticks back to wall-clock instants.  Each run owns a
/// fresh clock; it is never shared between runs.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Unix timestamp (seconds since epoch) of tick 0.
    pub start_unix_secs: i64,
    /// The current tick, moved forward by [`SimClock::advance_to`].
    pub now: Tick,
}

impl SimClock {
    pub fn new(start_unix_secs: i64) -> Self {
        Self { start_unix_secs, now: Tick::ZERO }
    }

    /// Jump to `tick`.  Time never runs backwards.
    #[inline]
    pub fn advance_to(&mut self, tick: Tick) {
        debug_assert!(tick >= self.now, "clock moved backwards: {tick} < {}", self.now);
        self.now = tick;
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> u64 {
        self.now.0
    }

    #[inline]
    pub fn elapsed_hours(&self) -> f64 {
        self.now.as_hours()
    }

    /// Unix timestamp corresponding to `tick`.
    #[inline]
    pub fn unix_secs_at(&self, tick: Tick) -> i64 {
        self.start_unix_secs + tick.0 as i64
    }
}
