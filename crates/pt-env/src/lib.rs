//! `pt-env` — the ticket backlog decision process.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ticket`]      | `TicketPool`, CSV loading, `Ticket`, feature helpers      |
//! | [`enrichment`]  | Bottleneck scores + embeddings per activity               |
//! | [`observation`] | `Observation` matrix, `FeatureSet`                        |
//! | [`env`]         | `Environment` trait, `TicketEnv`, `rank_reward`           |
//! | [`policy`]      | `Policy`, `GreedyPolicy`, `RandomPolicy`, `evaluate`      |
//! | [`vec_env`]     | `VecEnv` — independent replicas                           |
//! | [`error`]       | `EnvError`, `EnvResult<T>`                                |
//!
//! # One step
//!
//! ```text
//! a        = min(action, len(backlog) - 1)
//! t        = backlog.remove(a)                 backlog is sorted by value ↓
//! rank     = |{ u ∈ backlog : u.value > t.value }|
//! reward   = 10 + 5·t.value/max   rank 0
//!            2                    rank 1
//!            0                    rank 2
//!            −5·rank              rank ≥ 3
//! enriched:  + 3·score  if score(t) > 0.4
//!            − 1        if max wait(backlog) > 36 h
//! refill one ticket from the shuffled pool, re-sort
//! terminated = backlog is empty
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                        |
//! |------------|-----------------------------------------------|
//! | `parallel` | `VecEnv::step` runs replicas on Rayon.        |

pub mod enrichment;
pub mod env;
pub mod error;
pub mod observation;
pub mod policy;
pub mod ticket;
pub mod vec_env;


pub use enrichment::{EmbeddingStats, Enrichment};
pub use env::{Environment, StepInfo, StepOutcome, TicketEnv, rank_reward};
pub use error::{EnvError, EnvResult};
pub use observation::{FeatureSet, Observation};
pub use policy::{Evaluation, GreedyPolicy, Policy, RandomPolicy, evaluate};
pub use ticket::{
    Ticket, TicketPool, TicketRecord, domain_code, load_tickets_csv, load_tickets_reader,
    priority_bucket,
};
pub use vec_env::VecEnv;
