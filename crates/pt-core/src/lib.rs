//! `pt-core` — foundational types for the `procure_twin` workspace.
//!
//! This crate is a dependency of every other `pt-*` crate.  It has no `pt-*`
//! dependencies and only small external ones (`rand`, `rustc-hash`,
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `CaseId`, `ActivityId`, `ResourceId`                  |
//! | [`names`]       | `NameTable` — string ↔ typed id interner              |
//! | [`time`]        | `Tick` (1 tick = 1 simulated second), `SimClock`      |
//! | [`rng`]         | `SimRng` (seeded, injectable)                         |
//! | [`config`]      | `TwinConfig`, `EnvConfig`                             |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, time and config.    |

pub mod config;
pub mod error;
pub mod ids;
pub mod names;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{EnvConfig, TwinConfig};
pub use error::{CoreError, CoreResult};
pub use ids::{ActivityId, CaseId, ResourceId};
pub use names::NameTable;
pub use rng::SimRng;
pub use time::{SECS_PER_HOUR, SimClock, Tick, secs_to_hours};
