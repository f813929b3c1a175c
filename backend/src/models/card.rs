//! Card model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db::base::{Persisted, Record, UniqueConstraint, Value};

/// A flashcard, optionally owned by a deck.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Card {
    pub id: Option<i64>,
    pub front: String,
    pub back: Option<String>,
    pub hint: Option<String>,
    pub deck_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Card {
    /// A card that has not been written yet.
    pub fn new(front: impl Into<String>, deck_id: Option<i64>) -> Self {
        Self {
            id: None,
            front: front.into(),
            back: None,
            hint: None,
            deck_id,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Record for Card {
    const TABLE: &'static str = "card";
    const NAME: &'static str = "Card";
    const COLUMNS: &'static [&'static str] = &["front", "back", "hint", "deck_id"];
    const UNIQUE_CONSTRAINTS: &'static [UniqueConstraint] = &[UniqueConstraint {
        name: "card_deck_id_front_uc",
        columns: &["deck_id", "front"],
    }];

    type Changes = CardChanges;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.front.clone().into(),
            self.back.clone().into(),
            self.hint.clone().into(),
            self.deck_id.into(),
        ]
    }

    fn mark_persisted(&mut self, persisted: Persisted) {
        self.id = Some(persisted.id);
        self.created_at = Some(persisted.created_at);
        self.updated_at = Some(persisted.updated_at);
    }

    fn apply(&mut self, changes: CardChanges) {
        if let Some(front) = changes.front {
            self.front = front;
        }
        if let Some(back) = changes.back {
            self.back = back;
        }
        if let Some(hint) = changes.hint {
            self.hint = hint;
        }
        if let Some(deck_id) = changes.deck_id {
            self.deck_id = deck_id;
        }
    }
}

/// Request body for creating a card.
///
/// `deck_id` is ignored on deck-scoped routes, which use the deck in the path.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCardRequest {
    pub front: String,
    #[serde(default)]
    pub back: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub deck_id: Option<i64>,
}

impl CreateCardRequest {
    pub fn into_card(self, deck_id: Option<i64>) -> Card {
        Card {
            back: self.back,
            hint: self.hint,
            ..Card::new(self.front, deck_id)
        }
    }
}

/// One entry of a bulk card update. Writable fields are replaced as a whole.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCardRequest {
    pub id: i64,
    pub front: String,
    #[serde(default)]
    pub back: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl UpdateCardRequest {
    pub fn into_card(self, deck_id: i64) -> Card {
        Card {
            id: Some(self.id),
            back: self.back,
            hint: self.hint,
            ..Card::new(self.front, Some(deck_id))
        }
    }
}

/// Partial update of a card.
///
/// Absent fields are left unchanged. An explicit `null` clears `back` or
/// `hint`, or detaches the card from its deck.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardChanges {
    #[serde(default)]
    pub front: Option<String>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub back: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub hint: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub deck_id: Option<Option<i64>>,
}
