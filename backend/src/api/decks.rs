//! Deck API endpoints.

use axum::Json;

use super::extract::{JsonBody, PathParam};
use super::{created, require_text, ApiResult, CreatedResult};
use crate::db::{DecksService, Session};
use crate::errors::AppError;
use crate::models::{CreateDeckRequest, Deck, DeckChanges, DeckWithCards};

/// GET /api/decks - List all decks.
pub async fn list_decks(mut session: Session) -> ApiResult<Vec<Deck>> {
    let decks = DecksService::new(&mut session).list().await?;
    Ok(Json(decks))
}

/// GET /api/decks/:deck_id - Get a deck with its cards.
pub async fn get_deck(
    mut session: Session,
    PathParam(deck_id): PathParam<i64>,
) -> ApiResult<DeckWithCards> {
    DecksService::new(&mut session)
        .get_with_cards(deck_id)
        .await?
        .map(Json)
        .ok_or_else(|| deck_not_found(deck_id))
}

/// POST /api/decks - Create a new deck.
pub async fn create_deck(
    mut session: Session,
    JsonBody(request): JsonBody<CreateDeckRequest>,
) -> CreatedResult<Deck> {
    require_text("name", &request.name)?;

    let deck = DecksService::new(&mut session).create(request).await?;
    created(deck)
}

/// PUT /api/decks/:deck_id - Update a deck.
pub async fn update_deck(
    mut session: Session,
    PathParam(deck_id): PathParam<i64>,
    JsonBody(changes): JsonBody<DeckChanges>,
) -> ApiResult<Deck> {
    if let Some(name) = &changes.name {
        require_text("name", name)?;
    }

    DecksService::new(&mut session)
        .update(deck_id, changes)
        .await?
        .map(Json)
        .ok_or_else(|| deck_not_found(deck_id))
}

pub(super) fn deck_not_found(deck_id: i64) -> AppError {
    AppError::NotFound(format!("Deck {} not found", deck_id))
}
