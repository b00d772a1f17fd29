use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use recall_core::RecordKind;

#[derive(Parser)]
#[command(name = "recall")]
#[command(about = "Training decks that stay in sync and stay free of duplicates")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare the local cache with the remote store
    Status {
        /// Only check one collection
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Pull stale collections from the remote store
    Sync {
        /// Only reconcile one collection
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Find existing cards similar to some text
    Similar {
        /// Text to compare against every card
        text: Vec<String>,
        /// Minimum score (0-100) for a fuzzy match
        #[arg(long)]
        threshold: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create an empty deck
    AddDeck {
        /// Deck name
        name: Vec<String>,
    },
    /// Add a card to a deck, refusing near-duplicates
    AddCard {
        /// Deck ID
        #[arg(long, value_name = "ID")]
        deck: String,
        /// Card content
        content: Vec<String>,
        /// Tag to attach (repeatable)
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// Add the card even if similar cards exist
        #[arg(long)]
        force: bool,
    },
    /// Delete a record
    Delete {
        /// Collection the record belongs to
        #[arg(long, value_enum)]
        kind: KindArg,
        /// Record ID
        id: String,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum KindArg {
    Decks,
    Goals,
    AppSettings,
}

impl From<KindArg> for RecordKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Decks => Self::Decks,
            KindArg::Goals => Self::Goals,
            KindArg::AppSettings => Self::AppSettings,
        }
    }
}
