use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] recall_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No card content provided")]
    EmptyContent,
    #[error("Deck name cannot be empty")]
    EmptyDeckName,
    #[error("Record ID cannot be empty")]
    EmptyRecordId,
    #[error("Search text cannot be empty")]
    EmptySearchText,
    #[error("Deck not found: {0}")]
    DeckNotFound(String),
    #[error("Found {0} similar card(s); pass --force to add anyway")]
    DuplicateCard(usize),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Sync incomplete: {0}")]
    SyncIncomplete(String),
}

impl CliError {
    /// Message shown to the user on failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Core(error) => error.user_message(),
            other => other.to_string(),
        }
    }
}
