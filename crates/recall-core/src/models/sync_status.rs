//! Sync status model

use serde::Serialize;

use super::record::RecordKind;

/// Result of comparing one local collection against its remote counterpart.
///
/// Derived on demand and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    /// Collection that was compared
    pub kind: RecordKind,
    /// Whether a full reconciliation pass is required
    pub needs_sync: bool,
    /// Human-readable explanation of the decision
    pub reason: String,
    /// Records in the local cache
    pub local_count: usize,
    /// Records in the remote store
    pub remote_count: usize,
    /// Newest local `updated_at`, if any local record carries one
    pub local_last_updated: Option<i64>,
    /// Newest remote `updated_at`, if any remote record carries one
    pub remote_last_updated: Option<i64>,
}
