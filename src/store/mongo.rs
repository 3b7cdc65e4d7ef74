use async_trait::async_trait;
use bson::{Bson, Document, doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection,
    options::{ClientOptions, Credential},
};
use tracing::{debug, info};

use super::{
    CARDS_COLLECTION, CardRepository, PRICE_FIELD, PRICING_COLLECTION, PRICING_SETTINGS_ID,
    PricingRepository, RARITY_FIELD, SEARCH_FIELDS, SHIPPING_RATES_COLLECTION, literal_pattern,
};
use crate::{config::MongoConfig, error::AppResult};

const APP_NAME: &str = "lorcana_shop";

/// MongoDB-backed store holding the three shop collections.
#[derive(Clone)]
pub struct MongoStore {
    cards: Collection<Document>,
    shipping_rates: Collection<Document>,
    pricing: Collection<Document>,
}

impl MongoStore {
    /// Connects and pings the server, so an unreachable store fails here
    /// instead of on the first request.
    pub async fn connect(config: &MongoConfig) -> AppResult<Self> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some(APP_NAME.to_string());

        match config.credentials() {
            Some((username, password)) => {
                let mut credential = Credential::default();
                credential.username = Some(username.to_string());
                credential.password = Some(password.to_string());
                options.credential = Some(credential);
                info!(
                    uri = %config.uri,
                    user = %username,
                    "connecting to MongoDB with authentication"
                );
            }
            None => {
                info!(uri = %config.uri, "connecting to MongoDB without authentication");
            }
        }

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);
        database.run_command(doc! { "ping": 1 }).await?;

        info!(database = %config.database, "MongoDB connection established");

        Ok(Self {
            cards: database.collection(CARDS_COLLECTION),
            shipping_rates: database.collection(SHIPPING_RATES_COLLECTION),
            pricing: database.collection(PRICING_COLLECTION),
        })
    }

    /// No route reads shipping rates.
    pub fn shipping_rates(&self) -> &Collection<Document> {
        &self.shipping_rates
    }
}

fn search_filter(query: &str) -> Document {
    let pattern = literal_pattern(query);
    let clauses: Vec<Bson> = SEARCH_FIELDS
        .iter()
        .map(|&field| {
            Bson::Document(doc! { field: { "$regex": pattern.as_str(), "$options": "i" } })
        })
        .collect();
    doc! { "$or": clauses }
}

#[async_trait]
impl CardRepository for MongoStore {
    async fn list(&self) -> AppResult<Vec<Document>> {
        let cursor = self.cards.find(doc! {}).await?;
        let cards: Vec<Document> = cursor.try_collect().await?;
        Ok(cards)
    }

    async fn find_by_id(&self, id: ObjectId) -> AppResult<Option<Document>> {
        Ok(self.cards.find_one(doc! { "_id": id }).await?)
    }

    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<Document>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let cursor = self.cards.find(search_filter(query)).limit(limit).await?;
        let cards: Vec<Document> = cursor.try_collect().await?;
        Ok(cards)
    }

    async fn set_price(&self, id: ObjectId, price: f64) -> AppResult<u64> {
        let result = self
            .cards
            .update_one(doc! { "_id": id }, doc! { "$set": { PRICE_FIELD: price } })
            .await?;
        Ok(result.modified_count)
    }

    async fn set_price_for_rarity(&self, rarity: &str, price: f64) -> AppResult<u64> {
        let result = self
            .cards
            .update_many(
                doc! { RARITY_FIELD: rarity },
                doc! { "$set": { PRICE_FIELD: price } },
            )
            .await?;
        debug!(
            rarity,
            matched = result.matched_count,
            modified = result.modified_count,
            "rarity price applied"
        );
        Ok(result.modified_count)
    }
}

#[async_trait]
impl PricingRepository for MongoStore {
    async fn insert_default_if_empty(&self, defaults: Document) -> AppResult<bool> {
        if self.pricing.count_documents(doc! {}).await? > 0 {
            return Ok(false);
        }

        // $setOnInsert keeps two concurrent starters from writing twice.
        let result = self
            .pricing
            .update_one(
                doc! { "_id": PRICING_SETTINGS_ID },
                doc! { "$setOnInsert": defaults },
            )
            .upsert(true)
            .await?;
        Ok(result.upserted_id.is_some())
    }

    async fn load(&self) -> AppResult<Option<Document>> {
        if let Some(settings) = self
            .pricing
            .find_one(doc! { "_id": PRICING_SETTINGS_ID })
            .await?
        {
            return Ok(Some(settings));
        }

        // Settings written before the well-known id existed.
        Ok(self.pricing.find_one(doc! {}).await?)
    }

    async fn save(&self, fields: Document) -> AppResult<u64> {
        let result = self
            .pricing
            .update_one(
                doc! { "_id": PRICING_SETTINGS_ID },
                doc! { "$set": fields },
            )
            .upsert(true)
            .await?;
        Ok(result.modified_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_filter_ors_every_field_case_insensitively() {
        let filter = search_filter("mickey.");
        let clauses = filter.get_array("$or").expect("filter should have $or");

        assert_eq!(clauses.len(), 3);
        for (clause, field) in clauses.iter().zip(SEARCH_FIELDS) {
            let clause = clause.as_document().expect("clause should be a document");
            let condition = clause.get_document(field).expect("clause should target field");
            assert_eq!(condition.get_str("$regex").ok(), Some(r"mickey\."));
            assert_eq!(condition.get_str("$options").ok(), Some("i"));
        }
    }
}
