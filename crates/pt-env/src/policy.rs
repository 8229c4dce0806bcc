//! Fixed policies and a step-budget evaluation loop.
//!
//! Used to benchmark a trained agent against reference strategies: the
//! greedy policy is the ceiling the reward shaping steers towards, the
//! random policy is the floor.

use pt_core::SimRng;
use serde::Serialize;

use crate::{Environment, Observation};

/// Maps an observation to an action.
pub trait Policy {
    fn act(&mut self, observation: &Observation) -> usize;
}

/// Always takes row 0, the most valuable pending ticket.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyPolicy;

impl Policy for GreedyPolicy {
    fn act(&mut self, _observation: &Observation) -> usize {
        0
    }
}

/// Uniform over the full action space, ignoring the observation.
#[derive(Clone, Debug)]
pub struct RandomPolicy {
    rng:     SimRng,
    actions: usize,
}

impl RandomPolicy {
    pub fn new(actions: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => SimRng::new(s),
            None => SimRng::from_entropy(),
        };
        Self { rng, actions: actions.max(1) }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _observation: &Observation) -> usize {
        self.rng.gen_range(0..self.actions)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Evaluation {
    pub steps:           usize,
    /// Episodes that terminated within the budget.
    pub episodes:        usize,
    pub total_reward:    f64,
    pub value_processed: f64,
}

impl Evaluation {
    pub fn mean_reward(&self) -> f64 {
        if self.steps == 0 { 0.0 } else { self.total_reward / self.steps as f64 }
    }
}

/// Run `policy` for exactly `steps` steps, resetting whenever an episode
/// ends.
pub fn evaluate<E, P>(env: &mut E, policy: &mut P, steps: usize) -> Evaluation
where
    E: Environment + ?Sized,
    P: Policy + ?Sized,
{
    let mut eval = Evaluation { steps, ..Evaluation::default() };
    let (mut obs, _) = env.reset(None);
    for _ in 0..steps {
        let action = policy.act(&obs);
        let out = env.step(action);
        eval.total_reward += out.reward;
        eval.value_processed += out.info.selected_value.unwrap_or(0.0);
        if out.terminated || out.truncated {
            eval.episodes += 1;
            obs = env.reset(None).0;
        } else {
            obs = out.observation;
        }
    }
    log::debug!(
        "evaluated {steps} steps: {} episodes, reward {:.1}, value {:.1}",
        eval.episodes,
        eval.total_reward,
        eval.value_processed
    );
    eval
}
