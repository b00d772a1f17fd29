use recall_core::{AppSetting, Deck, Goal, RecordKind, SyncStatus};

use crate::commands::common::{format_status_line, Engine};
use crate::error::CliError;

pub async fn collect_statuses(engine: &Engine, kind: Option<RecordKind>) -> Vec<SyncStatus> {
    let kinds = kind.map_or_else(|| RecordKind::ALL.to_vec(), |kind| vec![kind]);
    let mut statuses = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let status = match kind {
            RecordKind::Decks => engine.sync_status::<Deck>().await,
            RecordKind::Goals => engine.sync_status::<Goal>().await,
            RecordKind::AppSettings => engine.sync_status::<AppSetting>().await,
        };
        statuses.push(status);
    }
    statuses
}

pub async fn run_status(
    engine: &Engine,
    kind: Option<RecordKind>,
    as_json: bool,
) -> Result<(), CliError> {
    let statuses = collect_statuses(engine, kind).await;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    if engine.is_standalone() {
        println!("No remote configured (set RECALL_API_URL); showing local cache only.");
    }
    for status in &statuses {
        println!("{}", format_status_line(status));
    }
    Ok(())
}
