//! `pt-trace` — event-log loading and per-case trace derivation.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                       |
//! |---------------|----------------------------------------------------------------|
//! | [`timestamp`] | `parse_timestamp_ms` — lenient instant parsing via `chrono`    |
//! | [`trace`]     | `EventRow`, `Step`, `Case`                                     |
//! | [`store`]     | `TraceStore` — derived cases + historical eligibility          |
//! | [`loader`]    | `load_event_log_csv`, `load_event_log_reader`, `load_or_empty` |
//! | [`error`]     | `TraceError`, `TraceResult<T>`                                 |
//!
//! # Derivation model (summary)
//!
//! ```text
//! rows     = parse(log) minus rows with malformed timestamps
//! per case = rows sorted by timestamp (stable)
//! step i   = (activity_i, min(ts_{i+1} - ts_i, max_step), resource_i)
//! last     = (activity_n, min(last_step, max_step), resource_n)
//! arrival  = ts_0
//! ```

pub mod error;
pub mod loader;
pub mod store;
pub mod timestamp;
pub mod trace;


pub use error::{TraceError, TraceResult};
pub use loader::{load_event_log_csv, load_event_log_reader, load_or_empty};
pub use store::TraceStore;
pub use timestamp::parse_timestamp_ms;
pub use trace::{Case, EventRow, Step};
