//! Access to the authoritative remote store
//!
//! The remote client is pure I/O: it maps each operation onto one REST call
//! and applies no retry or caching policy of its own.

mod http;

pub use http::HttpRemoteClient;

use serde_json::Value;

use crate::error::Result;
use crate::models::{RecordId, RecordKind, SyncRecord};

/// Typed operations against the remote store (async)
#[allow(async_fn_in_trait)]
pub trait RemoteClient {
    /// Every record of one kind
    async fn list_all<T: SyncRecord>(&self) -> Result<Vec<T>>;

    /// One record by id; absence is `Ok(None)`, not an error
    async fn get_one<T: SyncRecord>(&self, id: &RecordId) -> Result<Option<T>>;

    /// Create a record and return the stored version
    async fn create<T: SyncRecord>(&self, record: &T) -> Result<T>;

    /// Apply a partial update and return the stored version
    async fn update<T: SyncRecord>(&self, id: &RecordId, patch: &Value) -> Result<T>;

    /// Remove a record. Removing an absent record succeeds.
    async fn delete(&self, kind: RecordKind, id: &RecordId) -> Result<()>;
}
