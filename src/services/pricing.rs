use std::sync::Arc;

use bson::{Document, doc};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::{
    error::{AppError, AppResult},
    models::{PriceTable, PricingUpdate},
    normalize::normalize_document,
    store::{CardRepository, PricingRepository},
};

pub const PREMIUM_PACK_PRICE_FIELD: &str = "premiumPackPrice";
pub const SHIPPING_PRICES_FIELD: &str = "shippingPrices";
pub const RARITY_PRICES_FIELD: &str = "rarityPrices";
pub const LAST_UPDATED_FIELD: &str = "lastUpdated";

/// Pricing schedule written on first start.
pub fn default_pricing_document(now: DateTime<Utc>) -> Document {
    doc! {
        PREMIUM_PACK_PRICE_FIELD: 19.99,
        SHIPPING_PRICES_FIELD: {
            "GTA": 5.99,
            "Southern Ontario": 7.99,
            "Northern Ontario": 9.99,
            "Canada Wide": 12.99,
            "International": 24.99,
        },
        RARITY_PRICES_FIELD: {
            "Common": 0.99,
            "Uncommon": 1.99,
            "Rare": 4.99,
            "Super Rare": 9.99,
            "Legendary": 24.99,
        },
        LAST_UPDATED_FIELD: bson::DateTime::from_chrono(now),
    }
}

#[derive(Clone)]
pub struct PricingService {
    cards: Arc<dyn CardRepository>,
    settings: Arc<dyn PricingRepository>,
}

impl PricingService {
    pub fn new(cards: Arc<dyn CardRepository>, settings: Arc<dyn PricingRepository>) -> Self {
        Self { cards, settings }
    }

    /// Writes the default schedule unless some settings document already exists.
    pub async fn ensure_default_pricing(&self) -> AppResult<bool> {
        let inserted = self
            .settings
            .insert_default_if_empty(default_pricing_document(Utc::now()))
            .await?;
        if inserted {
            info!("default pricing settings created");
        }
        Ok(inserted)
    }

    pub async fn get_settings(&self) -> AppResult<JsonValue> {
        self.settings
            .load()
            .await?
            .map(|settings| normalize_document(&settings))
            .ok_or(AppError::NoSettingsFound)
    }

    /// Replaces the three pricing tables and stamps `lastUpdated`.
    ///
    /// Returns the modified count: 0 when the singleton had to be created.
    pub async fn update_settings(&self, update: &PricingUpdate) -> AppResult<u64> {
        let fields = doc! {
            PREMIUM_PACK_PRICE_FIELD: update.premium_pack_price,
            SHIPPING_PRICES_FIELD: update.shipping_prices.to_document(),
            RARITY_PRICES_FIELD: update.rarity_prices.to_document(),
            LAST_UPDATED_FIELD: bson::DateTime::from_chrono(Utc::now()),
        };

        let modified = self.settings.save(fields).await?;
        info!(modified, "pricing settings updated");
        Ok(modified)
    }

    /// Sets the price of every card of each rarity, in the caller's order.
    ///
    /// Rarities are applied one at a time; a failure leaves the rarities
    /// already applied in place.
    pub async fn apply_rarity_pricing(&self, prices: &PriceTable) -> AppResult<u64> {
        let mut updated = 0;
        for (rarity, price) in prices.iter() {
            let modified = self.cards.set_price_for_rarity(rarity, price.value()).await?;
            debug!(rarity, price = price.value(), modified, "rarity pricing applied");
            updated += modified;
        }
        info!(rarities = prices.len(), updated, "bulk rarity pricing finished");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_covers_every_region_and_rarity() {
        let defaults = default_pricing_document(Utc::now());

        assert_eq!(defaults.get_f64(PREMIUM_PACK_PRICE_FIELD).ok(), Some(19.99));
        let shipping = defaults.get_document(SHIPPING_PRICES_FIELD).unwrap();
        assert_eq!(shipping.len(), 5);
        assert_eq!(shipping.get_f64("International").ok(), Some(24.99));

        let rarity = defaults.get_document(RARITY_PRICES_FIELD).unwrap();
        let names: Vec<&String> = rarity.keys().collect();
        assert_eq!(names, ["Common", "Uncommon", "Rare", "Super Rare", "Legendary"]);
        assert!(defaults.get_datetime(LAST_UPDATED_FIELD).is_ok());
    }
}
