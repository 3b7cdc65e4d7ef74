use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId};
use regex::{Regex, RegexBuilder};
use tokio::sync::RwLock;

use super::{
    CardRepository, PRICE_FIELD, PRICING_SETTINGS_ID, PricingRepository, RARITY_FIELD,
    SEARCH_FIELDS, literal_pattern,
};
use crate::error::{AppError, AppResult};

/// Process-local store with the same observable semantics as [`super::MongoStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    cards: RwLock<Vec<Document>>,
    pricing: RwLock<Vec<Document>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a card, assigning an `_id` when the document has none.
    pub async fn insert_card(&self, mut card: Document) -> ObjectId {
        let id = match card.get_object_id("_id") {
            Ok(id) => id,
            Err(_) => {
                let id = ObjectId::new();
                card.insert("_id", id);
                id
            }
        };
        self.cards.write().await.push(card);
        id
    }

    /// Stores a raw settings document, bypassing the singleton rules.
    pub async fn insert_pricing(&self, settings: Document) {
        self.pricing.write().await.push(settings);
    }

    pub async fn pricing_count(&self) -> usize {
        self.pricing.read().await.len()
    }
}

fn search_regex(query: &str) -> AppResult<Regex> {
    RegexBuilder::new(&literal_pattern(query))
        .case_insensitive(true)
        .build()
        .map_err(|err| AppError::internal(format!("invalid search pattern: {err}")))
}

fn matches_search(card: &Document, regex: &Regex) -> bool {
    SEARCH_FIELDS
        .iter()
        .any(|field| matches!(card.get_str(field), Ok(value) if regex.is_match(value)))
}

/// Applies `$set` semantics: returns whether the stored value changed.
fn set_field(doc: &mut Document, key: &str, value: Bson) -> bool {
    if doc.get(key) == Some(&value) {
        return false;
    }
    doc.insert(key, value);
    true
}

fn is_singleton(doc: &Document) -> bool {
    doc.get_str("_id").is_ok_and(|id| id == PRICING_SETTINGS_ID)
}

#[async_trait]
impl CardRepository for InMemoryStore {
    async fn list(&self) -> AppResult<Vec<Document>> {
        Ok(self.cards.read().await.clone())
    }

    async fn find_by_id(&self, id: ObjectId) -> AppResult<Option<Document>> {
        let cards = self.cards.read().await;
        Ok(cards
            .iter()
            .find(|card| card.get_object_id("_id").is_ok_and(|card_id| card_id == id))
            .cloned())
    }

    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<Document>> {
        let regex = search_regex(query)?;
        let cards = self.cards.read().await;
        Ok(cards
            .iter()
            .filter(|card| matches_search(card, &regex))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn set_price(&self, id: ObjectId, price: f64) -> AppResult<u64> {
        let mut cards = self.cards.write().await;
        let Some(card) = cards
            .iter_mut()
            .find(|card| card.get_object_id("_id").is_ok_and(|card_id| card_id == id))
        else {
            return Ok(0);
        };
        Ok(u64::from(set_field(card, PRICE_FIELD, Bson::Double(price))))
    }

    async fn set_price_for_rarity(&self, rarity: &str, price: f64) -> AppResult<u64> {
        let mut cards = self.cards.write().await;
        let modified = cards
            .iter_mut()
            .filter(|card| card.get_str(RARITY_FIELD).is_ok_and(|value| value == rarity))
            .map(|card| set_field(card, PRICE_FIELD, Bson::Double(price)))
            .filter(|changed| *changed)
            .count();
        Ok(modified as u64)
    }
}

#[async_trait]
impl PricingRepository for InMemoryStore {
    async fn insert_default_if_empty(&self, mut defaults: Document) -> AppResult<bool> {
        let mut pricing = self.pricing.write().await;
        if !pricing.is_empty() {
            return Ok(false);
        }
        defaults.insert("_id", PRICING_SETTINGS_ID);
        pricing.push(defaults);
        Ok(true)
    }

    async fn load(&self) -> AppResult<Option<Document>> {
        let pricing = self.pricing.read().await;
        Ok(pricing
            .iter()
            .find(|doc| is_singleton(doc))
            .or_else(|| pricing.first())
            .cloned())
    }

    async fn save(&self, fields: Document) -> AppResult<u64> {
        let mut pricing = self.pricing.write().await;
        match pricing.iter_mut().find(|doc| is_singleton(doc)) {
            Some(settings) => {
                let mut changed = false;
                for (key, value) in fields {
                    changed |= set_field(settings, &key, value);
                }
                Ok(u64::from(changed))
            }
            None => {
                let mut settings = Document::new();
                settings.insert("_id", PRICING_SETTINGS_ID);
                for (key, value) in fields {
                    settings.insert(key, value);
                }
                pricing.push(settings);
                Ok(0)
            }
        }
    }
}
