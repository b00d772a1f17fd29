//! Write-through mutations: remote first, then pull the canonical record back.

use serde_json::Value;

use crate::db::LocalStore;
use crate::error::{Error, Result};
use crate::models::{apply_patch, RecordId, RecordKind, SyncRecord};
use crate::remote::RemoteClient;
use crate::util::now_millis;

use super::engine::SyncEngine;
use super::retry::with_retry;

/// A change to one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<T> {
    /// Create a new record. The remote may replace its id and timestamps.
    Create(T),
    /// Shallow-merge `patch` (a JSON object) over an existing record.
    Update { id: RecordId, patch: Value },
}

impl<T> Mutation<T> {
    const fn operation(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update { .. } => "update",
        }
    }
}

impl<R: RemoteClient, L: LocalStore> SyncEngine<R, L> {
    /// Apply a mutation and return the record as it is now stored.
    ///
    /// With a remote configured the write goes to the remote (retried on
    /// network failure) and the local cache is only updated from the
    /// remote's answer afterwards. A failed remote write leaves the cache
    /// untouched. A successful write whose pull-back fails surfaces as
    /// [`Error::Divergence`].
    pub async fn mutate<T: SyncRecord>(&self, mutation: Mutation<T>) -> Result<T> {
        let Some(remote) = &self.remote else {
            return self.mutate_local(mutation).await;
        };
        let operation = mutation.operation();

        let written = match &mutation {
            Mutation::Create(record) => {
                record.validate()?;
                with_retry(self.config.retry, T::KIND, operation, move || {
                    remote.create(record)
                })
                .await?
            }
            Mutation::Update { id, patch } => {
                if !patch.is_object() {
                    return Err(Error::InvalidInput("update patch must be a JSON object".into()));
                }
                // A patch that would leave the cached copy invalid never reaches the remote
                if let Some(cached) = self.local.get::<T>(id).await? {
                    apply_patch(&cached, patch, now_millis())?;
                }
                with_retry(self.config.retry, T::KIND, operation, move || {
                    remote.update::<T>(id, patch)
                })
                .await?
            }
        };

        let id = written.id().clone();
        tracing::debug!(kind = %T::KIND, id = %id, "Remote {operation} succeeded");

        match self.reconcile_one::<T>(&id).await {
            Ok(Some(canonical)) => Ok(canonical),
            Ok(None) => Err(diverged(
                T::KIND,
                &id,
                format!("record vanished from remote right after {operation}"),
            )),
            Err(error) => Err(diverged(
                T::KIND,
                &id,
                format!("could not pull record back after {operation}: {error}"),
            )),
        }
    }

    /// Delete a record remotely (retried on network failure), then locally.
    ///
    /// Returns whether the local cache held the record.
    pub async fn delete<T: SyncRecord>(&self, id: &RecordId) -> Result<bool> {
        let Some(remote) = &self.remote else {
            return self.local.delete(T::KIND, id).await;
        };

        with_retry(self.config.retry, T::KIND, "delete", move || {
            remote.delete(T::KIND, id)
        })
        .await?;

        self.local
            .delete(T::KIND, id)
            .await
            .map_err(|error| diverged(T::KIND, id, format!("deleted remotely but not locally: {error}")))
    }

    async fn mutate_local<T: SyncRecord>(&self, mutation: Mutation<T>) -> Result<T> {
        let record = match mutation {
            Mutation::Create(record) => {
                record.validate()?;
                record
            }
            Mutation::Update { id, patch } => {
                let existing = self
                    .local
                    .get::<T>(&id)
                    .await?
                    .ok_or_else(|| Error::NotFound(format!("{}/{id}", T::KIND)))?;
                apply_patch(&existing, &patch, now_millis())?
            }
        };
        self.local.put(&record).await?;
        tracing::debug!(kind = %T::KIND, id = %record.id(), "Wrote record to local cache");
        Ok(record)
    }
}

fn diverged(kind: RecordKind, id: &RecordId, reason: String) -> Error {
    tracing::warn!(kind = %kind, id = %id, "Local cache out of step with remote: {reason}");
    Error::Divergence {
        kind,
        id: id.to_string(),
        reason,
    }
}
