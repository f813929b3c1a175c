//! Data models for decks and cards.
//!
//! Entities serialize with the same snake_case field names as their columns.

mod card;
mod deck;

pub use card::*;
pub use deck::*;

use serde::{Deserialize, Deserializer};

/// Deserialize a nullable field of a partial update.
///
/// Paired with `#[serde(default)]`: an absent field stays `None`, an explicit
/// `null` becomes `Some(None)`.
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
