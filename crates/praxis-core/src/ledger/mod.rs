//! Progress ledger
//!
//! Every status transition is persisted as an immutable record *before*
//! any subscriber hears about it. Durability, not delivery, is the
//! guarantee: a crash can lose notifications, never history.

mod progress;
mod record;
mod store;

pub use progress::ProgressLedger;
pub use record::{ProgressEvent, ProgressRecord, StepStatus};
pub use store::{MemoryProgressStore, ProgressStore, SqliteProgressStore};
