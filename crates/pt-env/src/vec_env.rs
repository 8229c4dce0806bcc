//! `VecEnv` — independent environment replicas stepped together.
//!
//! Replicas share nothing mutable: each owns its RNG, backlog and counters,
//! and only the read-only ticket pool and enrichment tables sit behind an
//! `Arc`.  With the `parallel` feature `step` runs on Rayon's thread pool;
//! outcomes are returned in replica order either way.

use std::sync::Arc;

use pt_core::{EnvConfig, SimRng};

use crate::{EnvError, EnvResult, Enrichment, Environment, Observation, StepOutcome, TicketEnv, TicketPool};

pub struct VecEnv<E> {
    envs: Vec<E>,
}

impl<E: Environment + Send> VecEnv<E> {
    pub fn new(envs: Vec<E>) -> Self {
        Self { envs }
    }

    pub fn len(&self) -> usize {
        self.envs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envs.is_empty()
    }

    pub fn envs(&self) -> &[E] {
        &self.envs
    }

    /// Reset every replica.  With a seed, replica `i` is reseeded with
    /// [`SimRng::replica_seed`]`(seed, i)`.
    pub fn reset(&mut self, seed: Option<u64>) -> Vec<Observation> {
        self.envs
            .iter_mut()
            .enumerate()
            .map(|(i, env)| env.reset(seed.map(|s| SimRng::replica_seed(s, i as u64))).0)
            .collect()
    }

    /// Step replica `i` with `actions[i]`.
    ///
    /// A replica whose episode ends is reset at once; its outcome keeps the
    /// terminal reward and flags but carries the first observation of the
    /// new episode.
    pub fn step(&mut self, actions: &[usize]) -> EnvResult<Vec<StepOutcome>> {
        if actions.len() != self.envs.len() {
            return Err(EnvError::ActionCount { expected: self.envs.len(), got: actions.len() });
        }

        #[cfg(not(feature = "parallel"))]
        let outcomes = self
            .envs
            .iter_mut()
            .zip(actions)
            .map(|(env, &a)| step_auto_reset(env, a))
            .collect();

        #[cfg(feature = "parallel")]
        let outcomes = {
            use rayon::prelude::*;
            self.envs
                .par_iter_mut()
                .zip(actions.par_iter())
                .map(|(env, &a)| step_auto_reset(env, a))
                .collect()
        };

        Ok(outcomes)
    }
}

impl VecEnv<TicketEnv> {
    /// `n` ticket environments over one pool.  With `config.seed = Some(s)`
    /// replica `i` starts from [`SimRng::replica_seed`]`(s, i)`, so replica 0
    /// matches a lone environment built from `config`.
    pub fn tickets(
        n:          usize,
        pool:       Arc<TicketPool>,
        enrichment: Option<Arc<Enrichment>>,
        config:     &EnvConfig,
    ) -> EnvResult<Self> {
        let envs = (0..n)
            .map(|i| {
                let replica = EnvConfig {
                    seed: config.seed.map(|s| SimRng::replica_seed(s, i as u64)),
                    ..config.clone()
                };
                TicketEnv::with_parts(Arc::clone(&pool), enrichment.clone(), replica)
            })
            .collect::<EnvResult<Vec<_>>>()?;
        Ok(Self::new(envs))
    }
}

fn step_auto_reset<E: Environment>(env: &mut E, action: usize) -> StepOutcome {
    let mut out = env.step(action);
    if out.terminated || out.truncated {
        out.observation = env.reset(None).0;
    }
    out
}
