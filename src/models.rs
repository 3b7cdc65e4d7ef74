use std::fmt;

use bson::{Bson, Document};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{MapAccess, Visitor},
};
use serde_json::Value as JsonValue;

use crate::error::{AppError, AppResult};

/// A validated, non-negative, finite price.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Price(f64);

impl Price {
    pub fn new(value: f64) -> AppResult<Self> {
        if !value.is_finite() {
            return Err(AppError::invalid_price("price must be a finite number"));
        }
        if value < 0.0 {
            return Err(AppError::invalid_price("price must not be negative"));
        }
        Ok(Self(value))
    }

    /// Accepts JSON numbers and numeric strings such as `"4.99"`.
    pub fn from_json(value: &JsonValue) -> AppResult<Self> {
        let raw = match value {
            JsonValue::Number(number) => number
                .as_f64()
                .ok_or_else(|| AppError::invalid_price(format!("invalid price: {number}")))?,
            JsonValue::String(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| AppError::invalid_price(format!("invalid price: '{text}'")))?,
            other => {
                return Err(AppError::invalid_price(format!(
                    "price must be a number, got {other}"
                )));
            }
        };
        Self::new(raw)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<Price> for Bson {
    fn from(price: Price) -> Self {
        Bson::Double(price.0)
    }
}

/// A JSON object of name -> raw price, kept in the order the caller sent it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPriceTable(Vec<(String, JsonValue)>);

impl RawPriceTable {
    pub fn validate(&self) -> AppResult<PriceTable> {
        self.0
            .iter()
            .map(|(name, raw)| {
                Price::from_json(raw)
                    .map(|price| (name.clone(), price))
                    .map_err(|err| AppError::invalid_price(format!("{name}: {err}")))
            })
            .collect::<AppResult<Vec<_>>>()
            .map(PriceTable)
    }
}

impl FromIterator<(String, JsonValue)> for RawPriceTable {
    fn from_iter<I: IntoIterator<Item = (String, JsonValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for RawPriceTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = RawPriceTable;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object mapping names to prices")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, price)) = access.next_entry::<String, JsonValue>()? {
                    entries.push((name, price));
                }
                Ok(RawPriceTable(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// Validated name -> price pairs in caller order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable(Vec<(String, Price)>);

impl PriceTable {
    pub fn iter(&self) -> impl Iterator<Item = (&str, Price)> {
        self.0.iter().map(|(name, price)| (name.as_str(), *price))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for (name, price) in &self.0 {
            doc.insert(name.clone(), *price);
        }
        doc
    }
}

impl FromIterator<(String, Price)> for PriceTable {
    fn from_iter<I: IntoIterator<Item = (String, Price)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Search parameters; a repeated `q` resolves to its first value.
#[derive(Debug, Default, PartialEq)]
pub struct SearchQuery {
    pub q: Option<String>,
}

impl SearchQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let q = pairs
            .into_iter()
            .find_map(|(key, value)| (key == "q").then_some(value));
        Self { q }
    }

    pub fn text(&self) -> &str {
        self.q.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCardPriceRequest {
    pub price: Option<JsonValue>,
}

impl UpdateCardPriceRequest {
    pub fn validate(&self) -> AppResult<Price> {
        let raw = self
            .price
            .as_ref()
            .ok_or_else(|| AppError::missing_field("Price field is required"))?;
        Price::from_json(raw)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePricingRequest {
    pub premium_pack_price: Option<JsonValue>,
    pub shipping_prices: Option<RawPriceTable>,
    pub rarity_prices: Option<RawPriceTable>,
}

/// Fully validated replacement for the pricing settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingUpdate {
    pub premium_pack_price: Price,
    pub shipping_prices: PriceTable,
    pub rarity_prices: PriceTable,
}

impl UpdatePricingRequest {
    pub fn validate(&self) -> AppResult<PricingUpdate> {
        let (Some(premium), Some(shipping), Some(rarity)) = (
            self.premium_pack_price.as_ref(),
            self.shipping_prices.as_ref(),
            self.rarity_prices.as_ref(),
        ) else {
            return Err(AppError::missing_field("Missing required fields"));
        };

        Ok(PricingUpdate {
            premium_pack_price: Price::from_json(premium)?,
            shipping_prices: shipping.validate()?,
            rarity_prices: rarity.validate()?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRarityPricingRequest {
    pub rarity_prices: Option<RawPriceTable>,
}

impl ApplyRarityPricingRequest {
    pub fn validate(&self) -> AppResult<PriceTable> {
        self.rarity_prices
            .as_ref()
            .ok_or_else(|| AppError::missing_field("rarityPrices field is required"))?
            .validate()
    }
}

#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingUpdated {
    pub success: bool,
    pub message: String,
    pub modified_count: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
