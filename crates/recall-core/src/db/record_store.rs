//! libSQL-backed local cache

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use libsql::params::Params;
use libsql::{Connection, Value};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::{RecordId, RecordKind, SyncRecord};

use super::{Database, LocalStore};

/// Thread-safe record cache stored in a single `records` table.
#[derive(Clone)]
pub struct LibSqlStore {
    db: Arc<Mutex<Database>>,
}

impl LibSqlStore {
    /// Wrap an already opened database
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Open (or create) a cache file at the given path
    pub async fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Database::open(path).await?))
    }

    /// Open an in-memory cache (primarily for tests)
    pub async fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory().await?))
    }

    /// Count of cached records of one kind
    pub async fn count(&self, kind: RecordKind) -> Result<usize> {
        let db = self.db.lock().await;
        let mut rows = db
            .connection()
            .query(
                "SELECT COUNT(*) FROM records WHERE kind = ?",
                Params::Positional(vec![Value::Text(kind.as_str().to_string())]),
            )
            .await?;
        let count = match rows.next().await? {
            Some(row) => row.get::<i64>(0)?,
            None => 0,
        };
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn decode<T: SyncRecord>(id: &str, body: &str) -> Option<T> {
        match serde_json::from_str(body) {
            Ok(record) => Some(record),
            Err(error) => {
                tracing::warn!(
                    kind = %T::KIND,
                    id,
                    "Skipping cached record that no longer decodes: {error}"
                );
                None
            }
        }
    }
}

fn upsert_params<T: SyncRecord>(record: &T) -> Result<Params> {
    let body = serde_json::to_string(record)?;
    Ok(Params::Positional(vec![
        Value::Text(T::KIND.as_str().to_string()),
        Value::Text(record.id().as_str().to_string()),
        Value::Integer(record.created_at()),
        record.updated_at().map_or(Value::Null, Value::Integer),
        Value::Text(body),
    ]))
}

const UPSERT_SQL: &str = "INSERT OR REPLACE INTO records (kind, id, created_at, updated_at, body)
     VALUES (?, ?, ?, ?, ?)";

/// Upsert `records`, returning how many distinct rows now hold them.
async fn insert_all<T: SyncRecord>(conn: &Connection, records: &[T]) -> Result<usize> {
    let mut stored = HashSet::with_capacity(records.len());
    for record in records {
        conn.execute(UPSERT_SQL, upsert_params(record)?).await?;
        stored.insert(record.id());
    }
    Ok(stored.len())
}

/// Write `records` in one transaction, optionally clearing the kind first.
async fn in_transaction<T: SyncRecord>(
    conn: &Connection,
    clear_first: bool,
    records: &[T],
) -> Result<usize> {
    conn.execute("BEGIN TRANSACTION", ()).await?;

    let outcome = async {
        if clear_first {
            conn.execute(
                "DELETE FROM records WHERE kind = ?",
                Params::Positional(vec![Value::Text(T::KIND.as_str().to_string())]),
            )
            .await?;
        }
        insert_all(conn, records).await
    }
    .await;

    match outcome {
        Ok(written) => {
            if let Err(e) = conn.execute("COMMIT", ()).await {
                conn.execute("ROLLBACK", ()).await.ok();
                return Err(e.into());
            }
            Ok(written)
        }
        Err(error) => {
            conn.execute("ROLLBACK", ()).await.ok();
            Err(error)
        }
    }
}

impl LocalStore for LibSqlStore {
    async fn all<T: SyncRecord>(&self) -> Result<Vec<T>> {
        let db = self.db.lock().await;
        let mut rows = db
            .connection()
            .query(
                "SELECT id, body FROM records WHERE kind = ? ORDER BY created_at ASC, id ASC",
                Params::Positional(vec![Value::Text(T::KIND.as_str().to_string())]),
            )
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            let id: String = row.get(0)?;
            let body: String = row.get(1)?;
            if let Some(record) = Self::decode(&id, &body) {
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn get<T: SyncRecord>(&self, id: &RecordId) -> Result<Option<T>> {
        let db = self.db.lock().await;
        let mut rows = db
            .connection()
            .query(
                "SELECT body FROM records WHERE kind = ? AND id = ?",
                Params::Positional(vec![
                    Value::Text(T::KIND.as_str().to_string()),
                    Value::Text(id.as_str().to_string()),
                ]),
            )
            .await?;

        match rows.next().await? {
            Some(row) => {
                let body: String = row.get(0)?;
                Ok(Self::decode(id.as_str(), &body))
            }
            None => Ok(None),
        }
    }

    async fn clear(&self, kind: RecordKind) -> Result<()> {
        let db = self.db.lock().await;
        db.connection()
            .execute(
                "DELETE FROM records WHERE kind = ?",
                Params::Positional(vec![Value::Text(kind.as_str().to_string())]),
            )
            .await?;
        Ok(())
    }

    async fn bulk_insert<T: SyncRecord>(&self, records: &[T]) -> Result<usize> {
        let db = self.db.lock().await;
        in_transaction(db.connection(), false, records).await
    }

    async fn put<T: SyncRecord>(&self, record: &T) -> Result<()> {
        let db = self.db.lock().await;
        db.connection()
            .execute(UPSERT_SQL, upsert_params(record)?)
            .await?;
        Ok(())
    }

    async fn delete(&self, kind: RecordKind, id: &RecordId) -> Result<bool> {
        let db = self.db.lock().await;
        let removed = db
            .connection()
            .execute(
                "DELETE FROM records WHERE kind = ? AND id = ?",
                Params::Positional(vec![
                    Value::Text(kind.as_str().to_string()),
                    Value::Text(id.as_str().to_string()),
                ]),
            )
            .await?;
        Ok(removed > 0)
    }

    async fn replace_all<T: SyncRecord>(&self, records: &[T]) -> Result<usize> {
        let db = self.db.lock().await;
        in_transaction(db.connection(), true, records).await
    }
}
