//! In-process remote store used by the sync tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
use std::sync::Mutex;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{RecordId, RecordKind, SyncRecord};
use crate::remote::RemoteClient;

/// Remote that assigns its own ids and timestamps, like the real backend.
#[derive(Default)]
pub struct FakeRemote {
    records: Mutex<HashMap<(RecordKind, String), Value>>,
    clock: AtomicI64,
    next_id: AtomicU32,
    pub list_calls: AtomicU32,
    pub write_calls: AtomicU32,
    pub delete_calls: AtomicU32,
    refuse_connections: AtomicBool,
    fail_reads_after_write: AtomicBool,
    failing_lists: AtomicU32,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self {
            clock: AtomicI64::new(1_000_000),
            ..Self::default()
        }
    }

    /// Make every call fail as if the server were down
    pub fn refuse_connections(&self, refuse: bool) {
        self.refuse_connections.store(refuse, Ordering::SeqCst);
    }

    /// Make `get_one` fail once a write has gone through
    pub fn fail_reads_after_write(&self) {
        self.fail_reads_after_write.store(true, Ordering::SeqCst);
    }

    /// Make the next `count` calls to `list_all` fail with a network error
    pub fn fail_next_lists(&self, count: u32) {
        self.failing_lists.store(count, Ordering::SeqCst);
    }

    /// Store a record directly, bypassing id and timestamp assignment
    pub fn seed<T: SyncRecord>(&self, record: &T) {
        let value = serde_json::to_value(record).unwrap();
        self.records
            .lock()
            .unwrap()
            .insert((T::KIND, record.id().to_string()), value);
    }

    pub fn count(&self, kind: RecordKind) -> usize {
        self.records
            .lock()
            .unwrap()
            .keys()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    fn tick(&self) -> i64 {
        self.clock.fetch_add(1_000, Ordering::SeqCst) + 1_000
    }

    fn check_connection(&self) -> Result<()> {
        if self.refuse_connections.load(Ordering::SeqCst) {
            return Err(Error::Network("connect ECONNREFUSED 127.0.0.1:3000".into()));
        }
        Ok(())
    }
}

impl RemoteClient for FakeRemote {
    async fn list_all<T: SyncRecord>(&self) -> Result<Vec<T>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.check_connection()?;
        if self
            .failing_lists
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
        {
            return Err(Error::Network("connection reset by peer".into()));
        }
        let records = self.records.lock().unwrap();
        records
            .iter()
            .filter(|((kind, _), _)| *kind == T::KIND)
            .map(|(_, value)| serde_json::from_value::<T>(value.clone()).map_err(Error::from))
            .collect()
    }

    async fn get_one<T: SyncRecord>(&self, id: &RecordId) -> Result<Option<T>> {
        self.check_connection()?;
        if self.fail_reads_after_write.load(Ordering::SeqCst)
            && self.write_calls.load(Ordering::SeqCst) > 0
        {
            return Err(Error::Network("connection reset by peer".into()));
        }
        let records = self.records.lock().unwrap();
        records
            .get(&(T::KIND, id.to_string()))
            .map(|value| serde_json::from_value::<T>(value.clone()).map_err(Error::from))
            .transpose()
    }

    async fn create<T: SyncRecord>(&self, record: &T) -> Result<T> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check_connection()?;
        let id = format!("srv-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let now = self.tick();

        let mut value = serde_json::to_value(record)?;
        value["id"] = Value::from(id.clone());
        value["createdAt"] = Value::from(now);
        if value.get("updatedAt").is_some() {
            value["updatedAt"] = Value::from(now);
        }

        self.records
            .lock()
            .unwrap()
            .insert((T::KIND, id), value.clone());
        Ok(serde_json::from_value(value)?)
    }

    async fn update<T: SyncRecord>(&self, id: &RecordId, patch: &Value) -> Result<T> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check_connection()?;
        let now = self.tick();
        let mut records = self.records.lock().unwrap();
        let Some(existing) = records.get_mut(&(T::KIND, id.to_string())) else {
            return Err(Error::NotFound(format!("{}/{id}", T::KIND)));
        };
        if let (Value::Object(fields), Value::Object(changes)) = (&mut *existing, patch) {
            for (key, value) in changes {
                if key != "id" && key != "createdAt" {
                    fields.insert(key.clone(), value.clone());
                }
            }
            if fields.contains_key("updatedAt") || T::KIND != RecordKind::AppSettings {
                fields.insert("updatedAt".to_string(), Value::from(now));
            }
        }
        Ok(serde_json::from_value(existing.clone())?)
    }

    async fn delete(&self, kind: RecordKind, id: &RecordId) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check_connection()?;
        self.records.lock().unwrap().remove(&(kind, id.to_string()));
        Ok(())
    }
}
