use std::sync::Arc;

use bson::{Document, doc, oid::ObjectId};
use chrono::{DateTime, Utc};
use lorcana_shop::{
    AppError,
    models::{Price, PriceTable, PricingUpdate},
    services::PricingService,
    store::{CardRepository, InMemoryStore, PRICING_SETTINGS_ID},
};

fn service(store: &Arc<InMemoryStore>) -> PricingService {
    PricingService::new(store.clone(), store.clone())
}

fn table(entries: &[(&str, f64)]) -> PriceTable {
    entries
        .iter()
        .map(|(name, price)| (name.to_string(), Price::new(*price).unwrap()))
        .collect()
}

fn sample_update(premium: f64) -> PricingUpdate {
    PricingUpdate {
        premium_pack_price: Price::new(premium).unwrap(),
        shipping_prices: table(&[("GTA", 6.49), ("International", 29.99)]),
        rarity_prices: table(&[("Common", 1.25), ("Rare", 5.0)]),
    }
}

async fn price_of(store: &InMemoryStore, id: ObjectId) -> f64 {
    let card: Document = store.find_by_id(id).await.unwrap().unwrap();
    card.get_f64("Price").unwrap()
}

#[tokio::test]
async fn default_pricing_is_created_once() {
    let store = Arc::new(InMemoryStore::new());
    let pricing = service(&store);

    assert!(pricing.ensure_default_pricing().await.unwrap());
    assert!(!pricing.ensure_default_pricing().await.unwrap());
    assert_eq!(store.pricing_count().await, 1);

    let settings = pricing.get_settings().await.unwrap();
    assert_eq!(settings["_id"], PRICING_SETTINGS_ID);
    assert_eq!(settings["premiumPackPrice"], 19.99);
    assert_eq!(settings["shippingPrices"]["Canada Wide"], 12.99);
    assert_eq!(settings["rarityPrices"]["Super Rare"], 9.99);
    assert!(settings["lastUpdated"].is_string());
}

#[tokio::test]
async fn default_pricing_skips_when_any_document_exists() {
    let store = Arc::new(InMemoryStore::new());
    store
        .insert_pricing(doc! { "_id": ObjectId::new(), "premiumPackPrice": 1.0 })
        .await;
    let pricing = service(&store);

    assert!(!pricing.ensure_default_pricing().await.unwrap());

    let settings = pricing.get_settings().await.unwrap();
    assert_eq!(settings["premiumPackPrice"], 1.0);
}

#[tokio::test]
async fn missing_settings_are_reported() {
    let store = Arc::new(InMemoryStore::new());

    let err = service(&store).get_settings().await.unwrap_err();

    assert!(matches!(err, AppError::NoSettingsFound));
}

#[tokio::test]
async fn update_settings_upserts_single_document_and_stamps_time() {
    let store = Arc::new(InMemoryStore::new());
    let pricing = service(&store);
    let started: DateTime<Utc> = Utc::now();

    let created = pricing.update_settings(&sample_update(21.0)).await.unwrap();
    let modified = pricing.update_settings(&sample_update(22.0)).await.unwrap();

    assert_eq!(created, 0);
    assert_eq!(modified, 1);
    assert_eq!(store.pricing_count().await, 1);

    let settings = pricing.get_settings().await.unwrap();
    assert_eq!(settings["premiumPackPrice"], 22.0);
    assert_eq!(settings["shippingPrices"]["International"], 29.99);
    assert_eq!(settings["rarityPrices"]["Rare"], 5.0);

    let stamped = DateTime::parse_from_rfc3339(settings["lastUpdated"].as_str().unwrap())
        .unwrap()
        .with_timezone(&Utc);
    assert!(stamped.timestamp_millis() >= started.timestamp_millis());
}

#[tokio::test]
async fn apply_rarity_pricing_only_touches_matching_cards() {
    let store = Arc::new(InMemoryStore::new());
    let mut rares = Vec::new();
    let mut commons = Vec::new();
    for n in 0..3 {
        rares.push(
            store
                .insert_card(doc! { "Name": format!("Rare {n}"), "Rarity": "Rare", "Price": 0.0 })
                .await,
        );
    }
    for n in 0..2 {
        commons.push(
            store
                .insert_card(doc! {
                    "Name": format!("Common {n}"),
                    "Rarity": "Common",
                    "Price": 0.0,
                })
                .await,
        );
    }

    let updated = service(&store)
        .apply_rarity_pricing(&table(&[("Rare", 5.0)]))
        .await
        .unwrap();

    assert_eq!(updated, 3);
    for id in rares {
        assert_eq!(price_of(&store, id).await, 5.0);
    }
    for id in commons {
        assert_eq!(price_of(&store, id).await, 0.0);
    }
}

#[tokio::test]
async fn apply_rarity_pricing_sums_across_rarities_and_skips_unchanged() {
    let store = Arc::new(InMemoryStore::new());
    store
        .insert_card(doc! { "Name": "A", "Rarity": "Rare", "Price": 5.0 })
        .await;
    store
        .insert_card(doc! { "Name": "B", "Rarity": "Common", "Price": 0.5 })
        .await;
    store
        .insert_card(doc! { "Name": "C", "Rarity": "Common", "Price": 0.5 })
        .await;

    let updated = service(&store)
        .apply_rarity_pricing(&table(&[("Rare", 5.0), ("Common", 0.99), ("Enchanted", 99.0)]))
        .await
        .unwrap();

    assert_eq!(updated, 2);
}

#[tokio::test]
async fn rarity_match_is_exact() {
    let store = Arc::new(InMemoryStore::new());
    let id = store
        .insert_card(doc! { "Name": "D", "Rarity": "Super Rare", "Price": 0.0 })
        .await;

    let updated = service(&store)
        .apply_rarity_pricing(&table(&[("Rare", 4.99), ("super rare", 9.99)]))
        .await
        .unwrap();

    assert_eq!(updated, 0);
    assert_eq!(price_of(&store, id).await, 0.0);
}
