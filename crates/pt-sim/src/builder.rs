//! Fluent builder for constructing a [`DigitalTwin`].

use std::sync::Arc;

use pt_core::TwinConfig;
use pt_pool::PoolOverrides;
use pt_trace::TraceStore;

use crate::{DigitalTwin, SimResult};

/// Fluent builder for [`DigitalTwin`].
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                    |
/// |-------------------|----------------------------|
/// | `.config(c)`      | `TwinConfig::default()`    |
/// | `.seed(s)`        | `config.seed`              |
/// | `.overrides(o)`   | Historical eligibility     |
///
/// # Example
///
/// ```rust,ignore
/// let mut twin = TwinBuilder::new(store)
///     .seed(7)
///     .overrides(PoolOverrides::new().with("Approve", ["user_1", "new_hire"]))
///     .build()?;
/// let summary = twin.run(500);
/// ```
pub struct TwinBuilder {
    store:     Arc<TraceStore>,
    config:    TwinConfig,
    overrides: Option<PoolOverrides>,
}

impl TwinBuilder {
    pub fn new(store: impl Into<Arc<TraceStore>>) -> Self {
        Self {
            store:     store.into(),
            config:    TwinConfig::default(),
            overrides: None,
        }
    }

    pub fn config(mut self, config: TwinConfig) -> Self {
        self.config = config;
        self
    }

    /// Shorthand for overriding only the seed of the current config.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn overrides(mut self, overrides: PoolOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Validate the config and return a configured twin.
    pub fn build(self) -> SimResult<DigitalTwin> {
        self.config.validate()?;
        let mut twin = DigitalTwin::from_store(self.store, self.config);
        if self.overrides.is_some() {
            twin.configure(self.overrides.as_ref());
        }
        Ok(twin)
    }
}
