//! Deck and card models, including migration of legacy card shapes

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::record::{validate_common, RecordId, RecordKind, SyncRecord};

/// A deck of flashcard-like training cues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    /// Unique identifier
    pub id: RecordId,
    /// Display name
    pub name: String,
    /// Optional longer description
    #[serde(default)]
    pub description: Option<String>,
    /// Cards in display order
    #[serde(default)]
    pub cards: Vec<Card>,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

impl Deck {
    /// Create a new empty deck with a fresh id
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = crate::util::now_millis();
        Self {
            id: RecordId::new(),
            name: name.into(),
            description: None,
            cards: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder-style card append
    #[must_use]
    pub fn with_card(mut self, card: Card) -> Self {
        self.cards.push(card);
        self
    }
}

impl SyncRecord for Deck {
    const KIND: RecordKind = RecordKind::Decks;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn updated_at(&self) -> Option<i64> {
        Some(self.updated_at)
    }

    fn touch(&mut self, at: i64) {
        self.updated_at = at;
    }

    fn validate(&self) -> Result<()> {
        validate_common(self)?;
        if self.name.trim().is_empty() {
            return Err(Error::Validation(format!("deck {} has an empty name", self.id)));
        }
        if let Some(card) = self.cards.iter().find(|card| card.content.trim().is_empty()) {
            return Err(Error::Validation(format!(
                "card {} in deck {} has no content",
                card.id, self.id
            )));
        }
        Ok(())
    }
}

/// A single cue inside a deck. This is the unit the duplicate detector compares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "CardShape")]
pub struct Card {
    pub id: RecordId,
    pub content: String,
    pub tags: Vec<String>,
    /// How many times this card was marked helpful
    pub helpful_count: u32,
}

impl Card {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            content: content.into(),
            tags: Vec::new(),
            helpful_count: 0,
        }
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = normalize_tags(tags.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub const fn with_helpful_count(mut self, helpful_count: u32) -> Self {
        self.helpful_count = helpful_count;
        self
    }
}

/// Every card layout that has ever been written to either store.
#[derive(Deserialize)]
#[serde(untagged)]
enum CardShape {
    /// Oldest layout: the card was just its text
    Text(String),
    Current(CurrentCard),
    /// Two-sided layout from the first flashcard import
    FrontBack(FrontBackCard),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentCard {
    #[serde(default)]
    id: Option<RecordId>,
    content: String,
    #[serde(default)]
    tags: TagsShape,
    #[serde(default)]
    helpful_count: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrontBackCard {
    #[serde(default)]
    id: Option<RecordId>,
    front: String,
    #[serde(default)]
    back: String,
    #[serde(default)]
    tags: TagsShape,
    #[serde(default)]
    helpful_count: u32,
}

/// Tags were stored either as a list or as one joined string.
#[derive(Deserialize)]
#[serde(untagged)]
enum TagsShape {
    List(Vec<String>),
    /// Comma separated, or a JSON array encoded into a string
    Joined(String),
}

impl Default for TagsShape {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl From<TagsShape> for Vec<String> {
    fn from(shape: TagsShape) -> Self {
        match shape {
            TagsShape::List(tags) => normalize_tags(tags),
            TagsShape::Joined(joined) => {
                let trimmed = joined.trim();
                if trimmed.starts_with('[') {
                    if let Ok(tags) = serde_json::from_str::<Vec<String>>(trimmed) {
                        return normalize_tags(tags);
                    }
                }
                normalize_tags(trimmed.split(',').map(str::to_string))
            }
        }
    }
}

impl From<CardShape> for Card {
    fn from(shape: CardShape) -> Self {
        match shape {
            CardShape::Text(content) => Self {
                id: legacy_card_id(&content),
                content,
                tags: Vec::new(),
                helpful_count: 0,
            },
            CardShape::Current(card) => Self {
                id: card.id.unwrap_or_else(|| legacy_card_id(&card.content)),
                content: card.content,
                tags: card.tags.into(),
                helpful_count: card.helpful_count,
            },
            CardShape::FrontBack(card) => {
                let content = if card.back.trim().is_empty() {
                    card.front
                } else {
                    format!("{}\n{}", card.front.trim_end(), card.back.trim())
                };
                Self {
                    id: card.id.unwrap_or_else(|| legacy_card_id(&content)),
                    content,
                    tags: card.tags.into(),
                    helpful_count: card.helpful_count,
                }
            }
        }
    }
}

/// Trim, drop empties and de-duplicate (case-insensitively), keeping first-seen order.
fn normalize_tags(tags: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || normalized.iter().any(|seen| seen.eq_ignore_ascii_case(tag)) {
            continue;
        }
        normalized.push(tag.to_string());
    }
    normalized
}

/// Stable id for legacy cards that were stored without one (FNV-1a over the content).
fn legacy_card_id(content: &str) -> RecordId {
    let hash = content.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    });
    RecordId::from(format!("legacy-card-{hash:016x}"))
}
