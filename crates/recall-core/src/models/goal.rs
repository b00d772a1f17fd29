//! Goal model

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::record::{validate_common, RecordId, RecordKind, SyncRecord};

/// A training goal the user is working toward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// Unique identifier
    pub id: RecordId,
    /// Short title
    pub title: String,
    /// Optional detail
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the goal has been reached
    #[serde(default)]
    pub completed: bool,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms). Goals written by older clients lack it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl Goal {
    /// Create a new open goal
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        let now = crate::util::now_millis();
        Self {
            id: RecordId::new(),
            title: title.into(),
            description: None,
            completed: false,
            created_at: now,
            updated_at: Some(now),
        }
    }
}

impl SyncRecord for Goal {
    const KIND: RecordKind = RecordKind::Goals;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn updated_at(&self) -> Option<i64> {
        self.updated_at
    }

    fn touch(&mut self, at: i64) {
        self.updated_at = Some(at);
    }

    fn validate(&self) -> Result<()> {
        validate_common(self)?;
        if self.title.trim().is_empty() {
            return Err(Error::Validation(format!("goal {} has an empty title", self.id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_without_updated_at_has_unknown_freshness() {
        let goal: Goal =
            serde_json::from_str(r#"{"id":"g1","title":"Break 90","createdAt":1000}"#).unwrap();
        assert_eq!(goal.updated_at(), None);
        assert!(!goal.completed);
        assert!(goal.validate().is_ok());
    }

    #[test]
    fn goal_updated_before_created_is_invalid() {
        let mut goal = Goal::new("Break 90");
        goal.updated_at = Some(goal.created_at - 1);
        assert!(matches!(goal.validate(), Err(Error::Validation(_))));
    }
}
