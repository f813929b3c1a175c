//! Card API endpoints.

use axum::Json;
use chrono::{DateTime, Utc};

use super::decks::deck_not_found;
use super::extract::{JsonBody, PathParam, QueryParams};
use super::{created, require_items, require_text, ApiResult, CreatedResult};
use crate::db::base::{self, Condition, Op, Value};
use crate::db::{CardsService, DecksService, Session};
use crate::errors::AppError;
use crate::models::{Card, CardChanges, CreateCardRequest, UpdateCardRequest};

/// GET /api/decks/:deck_id/cards - List the cards of a deck.
pub async fn list_deck_cards(
    mut session: Session,
    PathParam(deck_id): PathParam<i64>,
) -> ApiResult<Vec<Card>> {
    ensure_deck(&mut session, deck_id).await?;

    let cards = CardsService::new(&mut session)
        .list_for_deck(deck_id)
        .await?;
    Ok(Json(cards))
}

/// POST /api/decks/:deck_id/cards - Create several cards in a deck.
pub async fn create_deck_cards(
    mut session: Session,
    PathParam(deck_id): PathParam<i64>,
    JsonBody(requests): JsonBody<Vec<CreateCardRequest>>,
) -> CreatedResult<Vec<Card>> {
    require_items(&requests)?;
    for request in &requests {
        require_text("front", &request.front)?;
    }
    ensure_deck(&mut session, deck_id).await?;

    let cards = CardsService::new(&mut session)
        .create_many(deck_id, requests)
        .await?;
    created(cards)
}

/// PUT /api/decks/:deck_id/cards - Update several cards in a deck.
pub async fn update_deck_cards(
    mut session: Session,
    PathParam(deck_id): PathParam<i64>,
    JsonBody(requests): JsonBody<Vec<UpdateCardRequest>>,
) -> ApiResult<Vec<Card>> {
    require_items(&requests)?;
    for request in &requests {
        require_text("front", &request.front)?;
    }
    ensure_deck(&mut session, deck_id).await?;

    let cards = CardsService::new(&mut session)
        .update_many(deck_id, requests)
        .await?;
    Ok(Json(cards))
}

/// GET /api/cards - Search cards.
///
/// Every query parameter is one condition, `column=value` or
/// `column__op=value` with `op` one of `eq`, `ne`, `lt`, `le`, `gt`, `ge`.
/// `null` matches a missing `id`/`deck_id`; timestamps are RFC 3339.
pub async fn search_cards(
    mut session: Session,
    QueryParams(params): QueryParams<Vec<(String, String)>>,
) -> ApiResult<Vec<Card>> {
    let conditions = params
        .iter()
        .map(|(key, raw)| card_condition(key, raw))
        .collect::<Result<Vec<_>, _>>()?;

    let cards = CardsService::new(&mut session).search(&conditions).await?;
    Ok(Json(cards))
}

/// POST /api/cards - Create a single card.
pub async fn create_card(
    mut session: Session,
    JsonBody(request): JsonBody<CreateCardRequest>,
) -> CreatedResult<Card> {
    require_text("front", &request.front)?;

    let card = CardsService::new(&mut session).create(request).await?;
    created(card)
}

/// GET /api/cards/:card_id - Get a single card.
pub async fn get_card(mut session: Session, PathParam(card_id): PathParam<i64>) -> ApiResult<Card> {
    CardsService::new(&mut session)
        .get(card_id)
        .await?
        .map(Json)
        .ok_or_else(|| card_not_found(card_id))
}

/// PUT /api/cards/:card_id - Update a single card.
pub async fn update_card(
    mut session: Session,
    PathParam(card_id): PathParam<i64>,
    JsonBody(changes): JsonBody<CardChanges>,
) -> ApiResult<Card> {
    if let Some(front) = &changes.front {
        require_text("front", front)?;
    }

    CardsService::new(&mut session)
        .update(card_id, changes)
        .await?
        .map(Json)
        .ok_or_else(|| card_not_found(card_id))
}

async fn ensure_deck(session: &mut Session, deck_id: i64) -> Result<(), AppError> {
    match DecksService::new(session).get(deck_id).await? {
        Some(_) => Ok(()),
        None => Err(deck_not_found(deck_id)),
    }
}

fn card_condition(key: &str, raw: &str) -> Result<Condition, AppError> {
    let (name, op) = match key.split_once("__") {
        Some((name, suffix)) => {
            let op = Op::from_suffix(suffix)
                .ok_or_else(|| AppError::invalid(key, format!("Unknown operator '{}'", suffix)))?;
            (name, op)
        }
        None => (key, Op::Eq),
    };
    let column = base::column::<Card>(name)
        .ok_or_else(|| AppError::invalid(key, format!("Unknown field '{}'", name)))?;

    let value = match column {
        "id" | "deck_id" if raw == "null" => Value::Null,
        "id" | "deck_id" => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| AppError::invalid(key, format!("{} must be an integer", name)))?,
        "created_at" | "updated_at" => DateTime::parse_from_rfc3339(raw)
            .map(|t| Value::from(t.with_timezone(&Utc)))
            .map_err(|_| AppError::invalid(key, format!("{} must be an RFC 3339 timestamp", name)))?,
        _ => Value::from(raw),
    };
    Ok(Condition::new(column, op, value))
}

fn card_not_found(card_id: i64) -> AppError {
    AppError::NotFound(format!("Card {} not found", card_id))
}
