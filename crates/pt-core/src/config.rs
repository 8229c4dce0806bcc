//! Run configuration for the digital twin and the ticket environment.
//!
//! Plain data with sensible defaults.  Applications typically build these in
//! code or load them from JSON (with the `serde` feature) and pass them to the
//! constructors; nothing in the workspace reads configuration from globals.

use crate::{CoreError, CoreResult};

// ── TwinConfig ────────────────────────────────────────────────────────────────

/// Configuration of the trace derivation and the discrete-event twin.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TwinConfig {
    /// Master RNG seed.  The same seed always produces identical summaries.
    pub seed: u64,

    /// Duration assigned to the last step of a case (no next event to measure
    /// against).  Default: 1 800 s (30 min).
    pub last_step_secs: u64,

    /// Upper bound on any step duration.  Default: 28 800 s (8 h).
    pub max_step_secs: u64,

    /// Default case limit used by callers that do not pass one explicitly.
    pub max_cases: usize,

    /// A step that waits longer than this for a resource counts as a long
    /// wait in the run summary.  Default: 86 400 s (one day).
    pub long_wait_secs: u64,
}

impl Default for TwinConfig {
    fn default() -> Self {
        Self {
            seed:           42,
            last_step_secs: 1_800,
            max_step_secs:  28_800,
            max_cases:      1_000,
            long_wait_secs: 86_400,
        }
    }
}

impl TwinConfig {
    /// Reject configurations the trace store cannot honour.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_step_secs == 0 {
            return Err(CoreError::Config("max_step_secs must be > 0".into()));
        }
        if self.last_step_secs > self.max_step_secs {
            return Err(CoreError::Config(format!(
                "last_step_secs ({}) exceeds max_step_secs ({})",
                self.last_step_secs, self.max_step_secs
            )));
        }
        Ok(())
    }
}

// ── EnvConfig ─────────────────────────────────────────────────────────────────

/// Configuration of the ticket backlog decision process.
///
/// The defaults reproduce the feature distribution and reward shaping that
/// existing trained agents expect; change them only for new experiments.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnvConfig {
    /// Seed for pool shuffles and synthetic wait draws.  `None` seeds from
    /// OS entropy.
    pub seed: Option<u64>,

    /// Backlog window size, which is also the action-space size.
    pub backlog_size: usize,

    /// Upper bound (inclusive) of the synthetic wait draw; also the
    /// normalisation constant of the wait feature.
    pub max_wait_hours: u32,

    /// Bottleneck score above which a selection earns the bonus.
    pub bottleneck_threshold: f32,

    /// Multiplier of the bottleneck bonus.
    pub bottleneck_bonus: f32,

    /// A remaining ticket waiting longer than this triggers the penalty.
    pub starvation_hours: u32,

    /// Penalty subtracted when any remaining ticket starves.
    pub starvation_penalty: f32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            seed:                 None,
            backlog_size:         5,
            max_wait_hours:       48,
            bottleneck_threshold: 0.4,
            bottleneck_bonus:     3.0,
            starvation_hours:     36,
            starvation_penalty:   1.0,
        }
    }
}

impl EnvConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.backlog_size == 0 {
            return Err(CoreError::Config("backlog_size must be > 0".into()));
        }
        if self.max_wait_hours == 0 {
            return Err(CoreError::Config("max_wait_hours must be > 0".into()));
        }
        Ok(())
    }
}
