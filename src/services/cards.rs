use std::sync::Arc;

use bson::oid::ObjectId;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::Price,
    normalize::normalize_document,
    store::CardRepository,
};

/// Maximum number of cards returned by a search.
pub const SEARCH_LIMIT: usize = 50;

pub fn parse_card_id(id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id.trim())
        .map_err(|_| AppError::invalid_identifier(format!("'{id}' is not a valid card id")))
}

#[derive(Clone)]
pub struct CardService {
    cards: Arc<dyn CardRepository>,
}

impl CardService {
    pub fn new(cards: Arc<dyn CardRepository>) -> Self {
        Self { cards }
    }

    pub async fn list_all(&self) -> AppResult<Vec<JsonValue>> {
        let cards = self.cards.list().await?;
        Ok(cards.iter().map(normalize_document).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<JsonValue> {
        let id = parse_card_id(id)?;
        self.cards
            .find_by_id(id)
            .await?
            .map(|card| normalize_document(&card))
            .ok_or_else(|| AppError::not_found("Card not found"))
    }

    /// An empty query yields no results rather than the whole catalog.
    pub async fn search(&self, query: &str) -> AppResult<Vec<JsonValue>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let cards = self.cards.search(query, SEARCH_LIMIT).await?;
        debug!(query, results = cards.len(), "card search");
        Ok(cards.iter().take(SEARCH_LIMIT).map(normalize_document).collect())
    }

    /// A missing card and a price that did not change are reported the same way.
    pub async fn set_price(&self, id: &str, price: Price) -> AppResult<()> {
        let id = parse_card_id(id)?;
        let modified = self.cards.set_price(id, price.value()).await?;
        if modified == 0 {
            return Err(AppError::not_found("Card not found or price not changed"));
        }
        debug!(card_id = %id, price = price.value(), "card price updated");
        Ok(())
    }
}
