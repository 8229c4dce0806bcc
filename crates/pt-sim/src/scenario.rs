//! Batches of what-if scenarios over one shared trace store.
//!
//! Every scenario gets its own [`DigitalTwin`] (own pool, clock and RNG), so
//! scenarios never observe each other.  All of them use the same seed, which
//! makes baseline-vs-override comparisons paired rather than independent
//! draws.  With the `parallel` feature the twins run on Rayon's pool; results
//! come back in input order either way.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use pt_core::TwinConfig;
use pt_pool::PoolOverrides;
use pt_trace::TraceStore;

use crate::{DigitalTwin, RunSummary, SimError, SimResult};

/// A named pool configuration.  `overrides: None` is the historical pool.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name:      String,
    pub overrides: Option<PoolOverrides>,
}

impl Scenario {
    pub fn baseline(name: &str) -> Self {
        Self { name: name.to_owned(), overrides: None }
    }

    pub fn with_overrides(name: &str, overrides: PoolOverrides) -> Self {
        Self { name: name.to_owned(), overrides: Some(overrides) }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name:    String,
    pub summary: RunSummary,
}

/// Run each scenario on an independent twin and collect the summaries.
///
/// Fails only on an invalid `config` or duplicate scenario names.
pub fn run_scenarios(
    store:     &Arc<TraceStore>,
    config:    &TwinConfig,
    scenarios: &[Scenario],
    max_cases: usize,
) -> SimResult<Vec<ScenarioResult>> {
    config.validate()?;
    let mut seen = BTreeSet::new();
    for s in scenarios {
        if !seen.insert(s.name.as_str()) {
            return Err(SimError::Config(format!("duplicate scenario name {:?}", s.name)));
        }
    }

    let run_one = |scenario: &Scenario| {
        let mut twin = DigitalTwin::from_store(Arc::clone(store), config.clone());
        twin.configure(scenario.overrides.as_ref());
        ScenarioResult {
            name:    scenario.name.clone(),
            summary: twin.run(max_cases),
        }
    };

    #[cfg(not(feature = "parallel"))]
    let results = scenarios.iter().map(run_one).collect();

    #[cfg(feature = "parallel")]
    let results = {
        use rayon::prelude::*;
        scenarios.par_iter().map(run_one).collect()
    };

    Ok(results)
}
