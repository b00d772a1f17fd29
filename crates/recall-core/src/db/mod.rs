//! Local cache layer for Recall
//!
//! The cache mirrors each remote collection as a keyed set of records. Only the
//! sync engine writes to it; everything else reads.

mod connection;
mod memory;
mod migrations;
mod record_store;

pub use connection::Database;
pub use memory::MemoryStore;
pub use record_store::LibSqlStore;

use crate::error::Result;
use crate::models::{RecordId, RecordKind, SyncRecord};

/// Keyed, per-kind record storage (async)
#[allow(async_fn_in_trait)]
pub trait LocalStore {
    /// Every cached record of one kind, in no particular order
    async fn all<T: SyncRecord>(&self) -> Result<Vec<T>>;

    /// One cached record by id
    async fn get<T: SyncRecord>(&self, id: &RecordId) -> Result<Option<T>>;

    /// Remove every record of one kind
    async fn clear(&self, kind: RecordKind) -> Result<()>;

    /// Insert records, overwriting any with the same id. Returns how many were written.
    async fn bulk_insert<T: SyncRecord>(&self, records: &[T]) -> Result<usize>;

    /// Insert or overwrite a single record
    async fn put<T: SyncRecord>(&self, record: &T) -> Result<()>;

    /// Remove one record. Returns whether it existed.
    async fn delete(&self, kind: RecordKind, id: &RecordId) -> Result<bool>;

    /// Make the collection hold exactly `records`.
    ///
    /// Implementations should make this all-or-nothing; the default is only
    /// as atomic as `clear` followed by `bulk_insert`.
    async fn replace_all<T: SyncRecord>(&self, records: &[T]) -> Result<usize> {
        self.clear(T::KIND).await?;
        self.bulk_insert(records).await
    }
}
