//! Deck model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Card;
use crate::db::base::{Persisted, Record, Value};

/// A named collection of cards.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Deck {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Deck {
    /// A deck that has not been written yet.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Record for Deck {
    const TABLE: &'static str = "deck";
    const NAME: &'static str = "Deck";
    const COLUMNS: &'static [&'static str] = &["name", "description"];

    type Changes = DeckChanges;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![self.name.clone().into(), self.description.clone().into()]
    }

    fn mark_persisted(&mut self, persisted: Persisted) {
        self.id = Some(persisted.id);
        self.created_at = Some(persisted.created_at);
        self.updated_at = Some(persisted.updated_at);
    }

    fn apply(&mut self, changes: DeckChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
    }
}

/// A deck together with the cards it owns.
#[derive(Debug, Clone, Serialize)]
pub struct DeckWithCards {
    #[serde(flatten)]
    pub deck: Deck,
    pub cards: Vec<Card>,
}

/// Request body for creating a new deck.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDeckRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update of a deck; absent fields are left unchanged, `null`
/// clears `description`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeckChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub description: Option<Option<String>>,
}
