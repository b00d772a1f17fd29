use std::ffi::OsString;
use std::path::{Path, PathBuf};

use recall_core::db::LibSqlStore;
use recall_core::remote::HttpRemoteClient;
use recall_core::search::SimilarityCandidate;
use recall_core::sync::ReconcileOutcome;
use recall_core::{EngineConfig, RecordId, SyncEngine, SyncStatus};

use crate::error::CliError;

pub type Engine = SyncEngine<HttpRemoteClient, LibSqlStore>;

pub async fn open_engine(db_path: &Path, config: EngineConfig) -> Result<Engine, CliError> {
    let store = LibSqlStore::open_path(db_path).await?;
    Ok(SyncEngine::from_config(store, config)?)
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>, env_db_path: Option<OsString>) -> PathBuf {
    cli_db_path
        .or_else(|| env_db_path.map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("recall")
        .join("recall.db")
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_record_id(id: &str) -> Result<RecordId, CliError> {
    normalize_content(id)
        .map(RecordId::from)
        .ok_or(CliError::EmptyRecordId)
}

pub fn format_sync_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

fn format_optional_timestamp(timestamp_ms: Option<i64>) -> String {
    timestamp_ms.map_or_else(|| "-".to_string(), format_sync_timestamp)
}

pub fn format_status_line(status: &SyncStatus) -> String {
    format!(
        "{:<13} {:<11} local {:>4} ({})  remote {:>4} ({})  {}",
        status.kind.as_str(),
        if status.needs_sync { "stale" } else { "up to date" },
        status.local_count,
        format_optional_timestamp(status.local_last_updated),
        status.remote_count,
        format_optional_timestamp(status.remote_last_updated),
        status.reason
    )
}

pub fn format_outcome_line(outcome: &ReconcileOutcome) -> String {
    if outcome.was_out_of_sync {
        format!(
            "{:<13} synced {} record(s): {}",
            outcome.kind.as_str(),
            outcome.synced,
            outcome.reason
        )
    } else {
        format!("{:<13} unchanged: {}", outcome.kind.as_str(), outcome.reason)
    }
}

pub fn format_match_line(candidate: &SimilarityCandidate) -> String {
    let class = if candidate.exact_match { "exact" } else { "similar" };
    let deck = candidate.deck_name.as_deref().unwrap_or("?");
    let mut line = format!(
        "{:>5.1}% {:<7} [{}] {} ({})",
        candidate.score, class, deck, candidate.content, candidate.record_id
    );
    if !candidate.tags.is_empty() {
        line.push_str(&format!(" #{}", candidate.tags.join(" #")));
    }
    line
}
