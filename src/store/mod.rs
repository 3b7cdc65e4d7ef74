//! Document store adapter
//!
//! The services never talk to a driver directly. They hold the repository
//! traits below, which are implemented by [`MongoStore`] for production and
//! [`InMemoryStore`] for tests and local demos. Both follow document-store
//! update semantics: a write that leaves a field byte-for-byte identical is
//! matched but not counted as modified.

use std::sync::Arc;

use async_trait::async_trait;
use bson::{Document, oid::ObjectId};

use crate::error::AppResult;

pub mod memory;
pub mod mongo;

pub use memory::InMemoryStore;
pub use mongo::MongoStore;

pub const CARDS_COLLECTION: &str = "Cards";
pub const SHIPPING_RATES_COLLECTION: &str = "ShippingRates";
pub const PRICING_COLLECTION: &str = "PricingSettings";

/// Well-known `_id` of the pricing settings singleton.
pub const PRICING_SETTINGS_ID: &str = "global";

pub const NAME_FIELD: &str = "Name";
pub const SET_NUM_FIELD: &str = "Set_Num";
pub const RARITY_FIELD: &str = "Rarity";
pub const PRICE_FIELD: &str = "Price";

/// Fields matched by card search.
pub const SEARCH_FIELDS: [&str; 3] = [NAME_FIELD, SET_NUM_FIELD, RARITY_FIELD];

#[async_trait]
pub trait CardRepository: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Document>>;
    async fn find_by_id(&self, id: ObjectId) -> AppResult<Option<Document>>;
    /// Case-insensitive literal substring match over [`SEARCH_FIELDS`].
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<Document>>;
    /// Returns the number of documents actually modified (0 or 1).
    async fn set_price(&self, id: ObjectId, price: f64) -> AppResult<u64>;
    /// Returns the number of documents actually modified.
    async fn set_price_for_rarity(&self, rarity: &str, price: f64) -> AppResult<u64>;
}

#[async_trait]
pub trait PricingRepository: Send + Sync {
    /// Inserts `defaults` under the well-known id when the collection is empty.
    /// Returns whether a document was written.
    async fn insert_default_if_empty(&self, defaults: Document) -> AppResult<bool>;
    async fn load(&self) -> AppResult<Option<Document>>;
    /// Upserts `fields` onto the singleton. Returns the modified count, which
    /// is 0 when the document had to be created.
    async fn save(&self, fields: Document) -> AppResult<u64>;
}

/// Repository handles shared by every request.
#[derive(Clone)]
pub struct Store {
    pub cards: Arc<dyn CardRepository>,
    pub pricing: Arc<dyn PricingRepository>,
}

impl Store {
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: CardRepository + PricingRepository + 'static,
    {
        Self {
            cards: store.clone(),
            pricing: store,
        }
    }
}

/// Escapes user input so it is matched as a literal, never as a pattern.
pub fn literal_pattern(query: &str) -> String {
    regex::escape(query)
}
