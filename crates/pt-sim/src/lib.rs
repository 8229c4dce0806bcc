//! `pt-sim` — discrete-event digital twin for the procure_twin workspace.
//!
//! # Event loop
//!
//! ```text
//! schedule Arrive(case) at (arrival − earliest arrival) for each case
//! while an event is due:
//!   advance the clock to its tick
//!   Arrive(c)  → request the first step
//!   Finish(c)  → release the resource (hand it to the oldest waiter),
//!                then request the next step or complete the case
//!
//! request(step):
//!   no eligible resources     → start now, zero wait
//!   shuffle eligible set      → take the first free one and start now
//!   all busy                  → queue (FIFO) on the first shuffled candidate
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | `run_scenarios` runs independent twins on Rayon.       |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use pt_core::TwinConfig;
//! use pt_pool::PoolOverrides;
//! use pt_sim::DigitalTwin;
//!
//! let mut twin = DigitalTwin::load("events.csv".as_ref(), TwinConfig::default())?;
//! let baseline = twin.run(1_000);
//! twin.configure(Some(&PoolOverrides::new().with("Approve", ["u1", "new_hire"])));
//! let what_if = twin.run(1_000);
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod queue;
pub mod scenario;
pub mod summary;
pub mod twin;

#[cfg(test)]
mod tests;

pub use builder::TwinBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, StepEvent, TwinObserver};
pub use queue::EventQueue;
pub use scenario::{Scenario, ScenarioResult, run_scenarios};
pub use summary::RunSummary;
pub use twin::DigitalTwin;
