//! Shared record identity and the contract every synced entity implements

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Opaque, stable identifier shared by the local cache and the remote store.
///
/// Ids are assigned once at creation and never change. Remote-assigned ids may
/// use any format, so the value is kept as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create a new unique record ID using UUID v7 (time-sortable)
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is empty or whitespace only
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The collections kept in sync. Each kind is reconciled independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    Decks,
    Goals,
    AppSettings,
}

impl RecordKind {
    /// Every kind, in the order a full refresh visits them.
    pub const ALL: [Self; 3] = [Self::Decks, Self::Goals, Self::AppSettings];

    /// Collection name used both as the REST path segment and the cache key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Decks => "decks",
            Self::Goals => "goals",
            Self::AppSettings => "app-settings",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "decks" | "deck" => Ok(Self::Decks),
            "goals" | "goal" => Ok(Self::Goals),
            "app-settings" | "app_settings" | "settings" => Ok(Self::AppSettings),
            other => Err(Error::InvalidInput(format!("unknown record kind '{other}'"))),
        }
    }
}

/// An entity that lives in both the local cache and the remote store.
pub trait SyncRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection this record belongs to
    const KIND: RecordKind;

    /// Stable identifier
    fn id(&self) -> &RecordId;

    /// Creation timestamp (Unix ms), assigned once
    fn created_at(&self) -> i64;

    /// Last mutation timestamp (Unix ms). `None` means unknown freshness.
    fn updated_at(&self) -> Option<i64>;

    /// Record a local mutation time. Kinds without freshness ignore this.
    fn touch(&mut self, at: i64);

    /// Reject malformed records before they reach either store.
    fn validate(&self) -> Result<()> {
        validate_common(self)
    }
}

/// Checks shared by every record kind.
pub fn validate_common<T: SyncRecord + ?Sized>(record: &T) -> Result<()> {
    if record.id().is_blank() {
        return Err(Error::Validation(format!("{} record id must not be empty", T::KIND)));
    }
    if record.created_at() < 0 {
        return Err(Error::Validation(format!(
            "{}/{} has a negative created_at",
            T::KIND,
            record.id()
        )));
    }
    if let Some(updated_at) = record.updated_at() {
        if updated_at < record.created_at() {
            return Err(Error::Validation(format!(
                "{}/{} was updated before it was created",
                T::KIND,
                record.id()
            )));
        }
    }
    Ok(())
}

/// Shallow-merge a JSON object over a record, keeping identity fields fixed.
///
/// `id` and `createdAt` in the patch are ignored. The result is validated and
/// its freshness bumped to `now` without ever moving backwards.
pub fn apply_patch<T: SyncRecord>(record: &T, patch: &Value, now: i64) -> Result<T> {
    let Value::Object(changes) = patch else {
        return Err(Error::InvalidInput("update patch must be a JSON object".into()));
    };

    let mut merged = serde_json::to_value(record)?;
    let Value::Object(fields) = &mut merged else {
        return Err(Error::Validation(format!("{} records must serialize as objects", T::KIND)));
    };
    for (key, value) in changes {
        if key == "id" || key == "createdAt" {
            continue;
        }
        fields.insert(key.clone(), value.clone());
    }

    let mut updated: T = serde_json::from_value(merged)
        .map_err(|error| Error::Validation(format!("invalid {} patch: {error}", T::KIND)))?;
    let previous = record.updated_at().unwrap_or(record.created_at());
    updated.touch(now.max(previous));
    updated.validate()?;
    Ok(updated)
}

/// Most recent known freshness across a collection.
pub fn last_updated<T: SyncRecord>(records: &[T]) -> Option<i64> {
    records.iter().filter_map(SyncRecord::updated_at).max()
}
