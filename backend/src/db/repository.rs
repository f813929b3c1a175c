//! Per-entity services over the generic persistence base.
//!
//! Each service borrows the request's session; write methods commit it.

use super::base::{self, Condition};
use super::{DbError, Session};
use crate::models::{
    Card, CardChanges, CreateCardRequest, CreateDeckRequest, Deck, DeckChanges,
    DeckWithCards, UpdateCardRequest,
};

/// Deck operations.
pub struct DecksService<'s> {
    session: &'s mut Session,
}

impl<'s> DecksService<'s> {
    pub fn new(session: &'s mut Session) -> Self {
        Self { session }
    }

    /// List all decks.
    pub async fn list(&mut self) -> Result<Vec<Deck>, DbError> {
        base::all(self.session).await
    }

    /// Get a deck by ID.
    pub async fn get(&mut self, id: i64) -> Result<Option<Deck>, DbError> {
        base::get_by_id(self.session, id).await
    }

    /// Get a deck by ID along with its cards.
    pub async fn get_with_cards(&mut self, id: i64) -> Result<Option<DeckWithCards>, DbError> {
        let Some(deck) = self.get(id).await? else {
            return Ok(None);
        };
        let cards = base::filter(self.session, &[Condition::eq("deck_id", id)]).await?;
        Ok(Some(DeckWithCards { deck, cards }))
    }

    /// Create a new deck.
    pub async fn create(&mut self, request: CreateDeckRequest) -> Result<Deck, DbError> {
        let mut deck = Deck::new(request.name, request.description);
        base::save(self.session, &mut deck, true).await?;
        tracing::info!(deck_id = ?deck.id, "Deck created");
        Ok(deck)
    }

    /// Apply a partial update to a deck. Returns `None` if it does not exist.
    pub async fn update(
        &mut self,
        id: i64,
        changes: DeckChanges,
    ) -> Result<Option<Deck>, DbError> {
        let Some(mut deck) = self.get(id).await? else {
            return Ok(None);
        };
        base::update(self.session, &mut deck, changes).await?;
        self.session.commit().await?;
        Ok(Some(deck))
    }
}

/// Card operations.
pub struct CardsService<'s> {
    session: &'s mut Session,
}

impl<'s> CardsService<'s> {
    pub fn new(session: &'s mut Session) -> Self {
        Self { session }
    }

    /// List the cards of a deck.
    pub async fn list_for_deck(&mut self, deck_id: i64) -> Result<Vec<Card>, DbError> {
        base::filter(self.session, &[Condition::eq("deck_id", deck_id)]).await
    }

    /// Cards matching every condition.
    pub async fn search(&mut self, conditions: &[Condition]) -> Result<Vec<Card>, DbError> {
        base::filter(self.session, conditions).await
    }

    /// Get a card by ID.
    pub async fn get(&mut self, id: i64) -> Result<Option<Card>, DbError> {
        base::get_by_id(self.session, id).await
    }

    /// Create a single card, in the deck named by the request if any.
    pub async fn create(&mut self, request: CreateCardRequest) -> Result<Card, DbError> {
        let deck_id = request.deck_id;
        let mut card = request.into_card(deck_id);
        base::save(self.session, &mut card, true).await?;
        tracing::info!(card_id = ?card.id, deck_id = ?card.deck_id, "Card created");
        Ok(card)
    }

    /// Create several cards in one deck, all or none.
    pub async fn create_many(
        &mut self,
        deck_id: i64,
        requests: Vec<CreateCardRequest>,
    ) -> Result<Vec<Card>, DbError> {
        let cards: Vec<Card> = requests
            .into_iter()
            .map(|r| r.into_card(Some(deck_id)))
            .collect();
        let cards = base::bulk_create(self.session, cards).await?;
        self.session.commit().await?;
        tracing::info!(deck_id, count = cards.len(), "Cards created");
        Ok(cards)
    }

    /// Replace the writable fields of several cards in one deck, all or none.
    pub async fn update_many(
        &mut self,
        deck_id: i64,
        requests: Vec<UpdateCardRequest>,
    ) -> Result<Vec<Card>, DbError> {
        let cards: Vec<Card> = requests
            .into_iter()
            .map(|r| r.into_card(deck_id))
            .collect();
        let cards = base::bulk_update(self.session, cards).await?;
        self.session.commit().await?;
        tracing::info!(deck_id, count = cards.len(), "Cards updated");
        Ok(cards)
    }

    /// Apply a partial update to a card. Returns `None` if it does not exist.
    pub async fn update(
        &mut self,
        id: i64,
        changes: CardChanges,
    ) -> Result<Option<Card>, DbError> {
        let Some(mut card) = self.get(id).await? else {
            return Ok(None);
        };
        base::update(self.session, &mut card, changes).await?;
        self.session.commit().await?;
        Ok(Some(card))
    }
}
