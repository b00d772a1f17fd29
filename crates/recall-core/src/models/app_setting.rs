//! Synced application setting model

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{RecordId, RecordKind, SyncRecord};

/// One key/value application setting shared across devices.
///
/// The id is the setting key. Settings carry no update timestamp, so their
/// freshness is always unknown and staleness is judged by count alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSetting {
    pub id: RecordId,
    pub value: Value,
    pub created_at: i64,
}

impl AppSetting {
    #[must_use]
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            id: RecordId::from(key.into()),
            value,
            created_at: crate::util::now_millis(),
        }
    }
}

impl SyncRecord for AppSetting {
    const KIND: RecordKind = RecordKind::AppSettings;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn updated_at(&self) -> Option<i64> {
        None
    }

    fn touch(&mut self, _at: i64) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::apply_patch;

    #[test]
    fn patch_replaces_value_but_keeps_key() {
        let setting = AppSetting::new("theme", Value::from("dark"));
        let patch = serde_json::json!({ "id": "other", "value": "light" });

        let updated = apply_patch(&setting, &patch, setting.created_at + 10).unwrap();
        assert_eq!(updated.id.as_str(), "theme");
        assert_eq!(updated.value, Value::from("light"));
        assert_eq!(updated.updated_at(), None);
    }
}
