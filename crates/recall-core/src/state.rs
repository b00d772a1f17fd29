//! Shared sync state for UI collaborators.

use serde::Serialize;

use crate::error::Result;
use crate::models::SyncStatus;
use crate::sync::{FullReconcile, ReconcileOutcome};

/// Coarse sync indicator a front end can render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Offline,
    Syncing,
    Synced,
    Error,
}

impl SyncState {
    /// State after a reconciliation attempt finished.
    pub fn after_reconcile(result: &Result<ReconcileOutcome>) -> Self {
        match result {
            Ok(_) => Self::Synced,
            Err(error) if error.is_network() => Self::Offline,
            Err(_) => Self::Error,
        }
    }

    /// State after reconciling every kind; the worst kind wins.
    pub fn after_full_reconcile(report: &FullReconcile) -> Self {
        if report.failures.iter().any(|(_, error)| error.is_network()) {
            Self::Offline
        } else if report.is_complete() {
            Self::Synced
        } else {
            Self::Error
        }
    }

    /// State implied by a status check alone.
    pub fn from_status(status: &SyncStatus) -> Self {
        if status.needs_sync {
            Self::Syncing
        } else {
            Self::Synced
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Syncing => "syncing",
            Self::Synced => "synced",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordKind;
    use crate::Error;

    #[test]
    fn network_failures_read_as_offline() {
        let failed: Result<ReconcileOutcome> = Err(Error::Network("connection refused".into()));
        assert_eq!(SyncState::after_reconcile(&failed), SyncState::Offline);

        let invalid: Result<ReconcileOutcome> = Err(Error::Validation("bad".into()));
        assert_eq!(SyncState::after_reconcile(&invalid), SyncState::Error);
    }

    #[test]
    fn full_reconcile_reports_worst_state() {
        let mut report = FullReconcile::default();
        assert_eq!(SyncState::after_full_reconcile(&report), SyncState::Synced);

        report
            .failures
            .push((RecordKind::Decks, Error::Database("locked".into())));
        assert_eq!(SyncState::after_full_reconcile(&report), SyncState::Error);

        report
            .failures
            .push((RecordKind::Goals, Error::Network("timed out".into())));
        assert_eq!(SyncState::after_full_reconcile(&report), SyncState::Offline);
        assert_eq!(SyncState::Offline.to_string(), "offline");
    }
}
