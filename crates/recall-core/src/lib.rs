//! recall-core - Core library for Recall
//!
//! This crate contains the record models, local cache, remote client,
//! reconciliation engine and duplicate detection shared by every Recall
//! front end (CLI included).

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod remote;
pub mod search;
pub mod state;
pub mod sync;
pub mod util;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use models::{AppSetting, Card, Deck, Goal, RecordId, RecordKind, SyncRecord, SyncStatus};
pub use state::SyncState;
pub use sync::{Mutation, SyncEngine};
