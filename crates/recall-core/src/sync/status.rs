//! Staleness evaluation between the local cache and the remote store.

use crate::error::{Error, Result};
use crate::models::{last_updated, RecordKind, SyncRecord, SyncStatus};

/// Decide whether the local collection needs a full reconciliation.
///
/// Rules are checked in order and the first match wins:
///
/// 1. local empty, remote non-empty: sync
/// 2. local non-empty, remote empty: do not sync (offline/bootstrap state;
///    local data is never cleared on this signal)
/// 3. local carries no freshness timestamps but remote does: sync
/// 4. remote's newest timestamp is newer than local's: sync
/// 5. counts differ: sync
/// 6. otherwise in sync
pub fn evaluate<T: SyncRecord>(local: &[T], remote: &[T]) -> SyncStatus {
    let local_last_updated = last_updated(local);
    let remote_last_updated = last_updated(remote);

    let (needs_sync, reason) = if local.is_empty() && !remote.is_empty() {
        (true, "local empty, remote has data".to_string())
    } else if !local.is_empty() && remote.is_empty() {
        (false, "local has data but remote empty".to_string())
    } else {
        match (local_last_updated, remote_last_updated) {
            (None, Some(_)) => (
                true,
                "local has no update timestamps, remote does".to_string(),
            ),
            (Some(local_at), Some(remote_at)) if remote_at > local_at => (
                true,
                format!("remote updated at {remote_at} is newer than local {local_at}"),
            ),
            _ if local.len() != remote.len() => (
                true,
                format!(
                    "count mismatch: local has {}, remote has {}",
                    local.len(),
                    remote.len()
                ),
            ),
            _ => (false, "in sync".to_string()),
        }
    };

    SyncStatus {
        kind: T::KIND,
        needs_sync,
        reason,
        local_count: local.len(),
        remote_count: remote.len(),
        local_last_updated,
        remote_last_updated,
    }
}

/// Evaluate from fetch results. Any fetch failure asks for a re-sync.
pub fn evaluate_fetched<T: SyncRecord>(local: &Result<Vec<T>>, remote: &Result<Vec<T>>) -> SyncStatus {
    match (local, remote) {
        (Ok(local), Ok(remote)) => evaluate(local, remote),
        (Err(error), other) => fetch_failed::<T>("local cache", error, 0, other_count(other)),
        (Ok(local), Err(error)) => fetch_failed::<T>("remote store", error, local.len(), 0),
    }
}

/// Status reported when there is no remote to compare against.
pub fn standalone_status(kind: RecordKind, local_count: usize) -> SyncStatus {
    SyncStatus {
        kind,
        needs_sync: false,
        reason: "no remote configured".to_string(),
        local_count,
        remote_count: 0,
        local_last_updated: None,
        remote_last_updated: None,
    }
}

fn other_count<T>(result: &Result<Vec<T>>) -> usize {
    result.as_ref().map_or(0, Vec::len)
}

fn fetch_failed<T: SyncRecord>(
    side: &str,
    error: &Error,
    local_count: usize,
    remote_count: usize,
) -> SyncStatus {
    tracing::warn!(kind = %T::KIND, "Could not read {side} while checking sync status: {error}");
    SyncStatus {
        kind: T::KIND,
        needs_sync: true,
        reason: format!("could not read {side}: {error}"),
        local_count,
        remote_count,
        local_last_updated: None,
        remote_last_updated: None,
    }
}
