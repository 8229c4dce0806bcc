//! `pt-pool` — single-capacity resources and who may perform what.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`overrides`] | `PoolOverrides` — activity → replacement resource list    |
//! | [`resource`]  | `Resource` — holder, FIFO waiters, busy-time counter      |
//! | [`pool`]      | `ResourcePool` — resource table + eligibility map         |
//! | [`error`]     | `PoolError`, `PoolResult<T>`                              |
//!
//! # Ownership
//!
//! The pool is the only mutator of the activity → resource mapping.  A twin
//! owns exactly one pool and calls [`ResourcePool::configure`] between runs,
//! never during one; `&mut` access makes that a compile-time guarantee.

pub mod error;
pub mod overrides;
pub mod pool;
pub mod resource;


pub use error::{PoolError, PoolResult};
pub use overrides::PoolOverrides;
pub use pool::ResourcePool;
pub use resource::Resource;
