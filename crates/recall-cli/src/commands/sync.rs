use recall_core::sync::{FullReconcile, ReconcileOutcome};
use recall_core::{AppSetting, Deck, Goal, RecordKind, SyncState};
use serde::Serialize;

use crate::commands::common::{format_outcome_line, Engine};
use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub state: SyncState,
    pub needs_app_refresh: bool,
    pub outcomes: Vec<ReconcileOutcome>,
    pub failures: Vec<SyncFailure>,
}

#[derive(Debug, Serialize)]
pub struct SyncFailure {
    pub kind: RecordKind,
    pub message: String,
}

impl From<FullReconcile> for SyncReport {
    fn from(report: FullReconcile) -> Self {
        Self {
            state: SyncState::after_full_reconcile(&report),
            needs_app_refresh: report.needs_app_refresh(),
            failures: report
                .failures
                .iter()
                .map(|(kind, error)| SyncFailure {
                    kind: *kind,
                    message: error.user_message(),
                })
                .collect(),
            outcomes: report.outcomes,
        }
    }
}

pub async fn reconcile_kind(engine: &Engine, kind: RecordKind) -> FullReconcile {
    let result = match kind {
        RecordKind::Decks => engine.reconcile_all::<Deck>().await,
        RecordKind::Goals => engine.reconcile_all::<Goal>().await,
        RecordKind::AppSettings => engine.reconcile_all::<AppSetting>().await,
    };
    let mut report = FullReconcile::default();
    match result {
        Ok(outcome) => report.outcomes.push(outcome),
        Err(error) => report.failures.push((kind, error)),
    }
    report
}

pub async fn run_sync(
    engine: &Engine,
    kind: Option<RecordKind>,
    as_json: bool,
) -> Result<(), CliError> {
    if engine.is_standalone() {
        return Err(CliError::Config(
            "no remote configured; set RECALL_API_URL to enable `recall sync`".to_string(),
        ));
    }

    let report = match kind {
        Some(kind) => reconcile_kind(engine, kind).await,
        None => engine.reconcile_everything().await,
    };
    let first_failure = report.failures.first().map(|(_, error)| error.user_message());
    let report = SyncReport::from(report);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for outcome in &report.outcomes {
            println!("{}", format_outcome_line(outcome));
        }
        for failure in &report.failures {
            println!("{:<13} failed: {}", failure.kind.as_str(), failure.message);
        }
        if report.needs_app_refresh {
            println!("Local data changed; reload any open views.");
        }
    }

    match first_failure {
        Some(message) => Err(CliError::SyncIncomplete(message)),
        None => Ok(()),
    }
}
