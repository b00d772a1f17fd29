//! Reconciliation between the local cache and the remote store.

use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::EngineConfig;
use crate::db::LocalStore;
use crate::error::{Error, Result};
use crate::models::{AppSetting, Deck, Goal, RecordId, RecordKind, SyncRecord, SyncStatus};
use crate::remote::{HttpRemoteClient, RemoteClient};
use crate::search::{candidates_from_decks, find_similar_limited, SimilarityCandidate};

use super::status::{evaluate, evaluate_fetched, standalone_status};

/// Result of one full reconciliation pass over a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    pub kind: RecordKind,
    /// Records written into the local cache
    pub synced: usize,
    /// Whether the collection was stale and got replaced
    pub was_out_of_sync: bool,
    pub reason: String,
}

impl ReconcileOutcome {
    fn unchanged(kind: RecordKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            synced: 0,
            was_out_of_sync: false,
            reason: reason.into(),
        }
    }
}

/// Per-kind outcomes of reconciling every collection.
#[derive(Debug, Default)]
pub struct FullReconcile {
    pub outcomes: Vec<ReconcileOutcome>,
    pub failures: Vec<(RecordKind, Error)>,
}

impl FullReconcile {
    /// Whether any collection actually moved data, so the host should reload
    /// whatever state it derived from the cache.
    pub fn needs_app_refresh(&self) -> bool {
        self.outcomes.iter().any(|outcome| outcome.was_out_of_sync)
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One reconciliation guard per collection kind.
#[derive(Default)]
struct KindLocks {
    decks: Mutex<()>,
    goals: Mutex<()>,
    app_settings: Mutex<()>,
}

impl KindLocks {
    const fn for_kind(&self, kind: RecordKind) -> &Mutex<()> {
        match kind {
            RecordKind::Decks => &self.decks,
            RecordKind::Goals => &self.goals,
            RecordKind::AppSettings => &self.app_settings,
        }
    }
}

/// Owns the local cache and (optionally) the remote store, and is the only
/// component that writes to the cache.
///
/// Without a remote the engine runs standalone: status always reports in
/// sync and mutations go straight to the local cache.
pub struct SyncEngine<R, L> {
    pub(super) remote: Option<R>,
    pub(super) local: L,
    pub(super) config: EngineConfig,
    locks: KindLocks,
}

impl<L: LocalStore> SyncEngine<HttpRemoteClient, L> {
    /// Build an engine talking HTTP to the remote named in `config`, or a
    /// standalone engine when none is configured.
    pub fn from_config(local: L, config: EngineConfig) -> Result<Self> {
        let remote = config
            .remote
            .as_ref()
            .map(HttpRemoteClient::new)
            .transpose()?;
        match &remote {
            Some(client) => tracing::info!("Remote store configured at {}", client.base_url()),
            None => tracing::info!("Running in standalone mode (no remote configured)"),
        }
        Ok(Self::new(remote, local, config))
    }
}

impl<R: RemoteClient, L: LocalStore> SyncEngine<R, L> {
    pub fn new(remote: Option<R>, local: L, config: EngineConfig) -> Self {
        Self {
            remote,
            local,
            config,
            locks: KindLocks::default(),
        }
    }

    pub const fn local(&self) -> &L {
        &self.local
    }

    pub const fn remote(&self) -> Option<&R> {
        self.remote.as_ref()
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub const fn is_standalone(&self) -> bool {
        self.remote.is_none()
    }

    /// Compare the local collection of `T` with the remote one.
    ///
    /// Never fails: an unreadable side is reported as needing a sync.
    pub async fn sync_status<T: SyncRecord>(&self) -> SyncStatus {
        let local = self.local.all::<T>().await;
        let Some(remote) = &self.remote else {
            return standalone_status(T::KIND, local.as_ref().map_or(0, Vec::len));
        };
        let fetched = remote.list_all::<T>().await;
        evaluate_fetched(&local, &fetched)
    }

    /// Replace the local collection of `T` with the remote one if it is stale.
    ///
    /// Calls for the same kind are serialized; a caller that queued behind an
    /// in-flight pass sees the freshly reconciled state and returns unchanged.
    pub async fn reconcile_all<T: SyncRecord>(&self) -> Result<ReconcileOutcome> {
        let Some(remote) = &self.remote else {
            return Ok(ReconcileOutcome::unchanged(T::KIND, "no remote configured"));
        };

        let _guard = self.locks.for_kind(T::KIND).lock().await;

        let local = self.local.all::<T>().await;
        let fetched = remote.list_all::<T>().await;
        let status = evaluate_fetched(&local, &fetched);
        if !status.needs_sync {
            tracing::debug!(kind = %T::KIND, "Collection up to date: {}", status.reason);
            return Ok(ReconcileOutcome::unchanged(T::KIND, status.reason));
        }

        let (records, reason) = match fetched {
            Ok(records) => (records, status.reason),
            Err(error) => {
                tracing::debug!(kind = %T::KIND, "Refetching remote collection after: {error}");
                let records = remote.list_all::<T>().await?;
                match &local {
                    Ok(local) => {
                        let recheck = evaluate(local, &records);
                        if !recheck.needs_sync {
                            tracing::debug!(
                                kind = %T::KIND,
                                "Collection up to date after refetch: {}",
                                recheck.reason
                            );
                            return Ok(ReconcileOutcome::unchanged(T::KIND, recheck.reason));
                        }
                        (records, recheck.reason)
                    }
                    Err(_) => (records, status.reason),
                }
            }
        };

        let synced = self.local.replace_all(&records).await?;
        tracing::info!(kind = %T::KIND, synced, "Reconciled collection: {reason}");

        Ok(ReconcileOutcome {
            kind: T::KIND,
            synced,
            was_out_of_sync: true,
            reason,
        })
    }

    /// Pull one record from the remote into the local cache.
    ///
    /// Returns the canonical record, or `None` when the remote does not have
    /// it (any stale local copy is dropped). Other records are untouched.
    pub async fn reconcile_one<T: SyncRecord>(&self, id: &RecordId) -> Result<Option<T>> {
        let Some(remote) = &self.remote else {
            return self.local.get::<T>(id).await;
        };

        match remote.get_one::<T>(id).await? {
            Some(record) => {
                self.local.put(&record).await?;
                tracing::debug!(kind = %T::KIND, id = %id, "Pulled record into local cache");
                Ok(Some(record))
            }
            None => {
                if self.local.delete(T::KIND, id).await? {
                    tracing::debug!(kind = %T::KIND, id = %id, "Dropped local copy missing from remote");
                }
                Ok(None)
            }
        }
    }

    /// Reconcile every collection kind independently.
    ///
    /// A failure in one kind does not stop the others.
    pub async fn reconcile_everything(&self) -> FullReconcile {
        let mut report = FullReconcile::default();
        for kind in RecordKind::ALL {
            let result = match kind {
                RecordKind::Decks => self.reconcile_all::<Deck>().await,
                RecordKind::Goals => self.reconcile_all::<Goal>().await,
                RecordKind::AppSettings => self.reconcile_all::<AppSetting>().await,
            };
            match result {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(error) => {
                    tracing::warn!(kind = %kind, "Reconciliation failed: {error}");
                    report.failures.push((kind, error));
                }
            }
        }
        report
    }

    /// Existing cards that look like duplicates of `text`, best first.
    pub async fn find_similar_cards(&self, text: &str) -> Result<Vec<SimilarityCandidate>> {
        let decks = self.local.all::<Deck>().await?;
        let candidates = candidates_from_decks(&decks);
        let duplicates = &self.config.duplicates;
        Ok(find_similar_limited(
            text,
            &candidates,
            duplicates.threshold,
            duplicates.max_results,
        ))
    }
}
