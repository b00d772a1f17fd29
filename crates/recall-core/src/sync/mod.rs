//! Keeping the local cache in step with the remote store
//!
//! The remote store is authoritative. [`SyncEngine`] decides when a local
//! collection is stale, replaces it wholesale when it is, and routes every
//! mutation through the remote before the cache sees it.

mod engine;
mod retry;
mod status;
mod write_through;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{FullReconcile, ReconcileOutcome, SyncEngine};
pub use retry::with_retry;
pub use status::{evaluate, evaluate_fetched, standalone_status};
pub use write_through::Mutation;
