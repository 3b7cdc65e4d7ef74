use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde_json::Value as JsonValue;

use crate::{
    error::AppResult,
    models::{
        ApiMessage, ApplyRarityPricingRequest, HealthResponse, PricingUpdated, SearchQuery,
        UpdateCardPriceRequest, UpdatePricingRequest,
    },
    state::AppState,
};

pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn list_cards(State(state): State<AppState>) -> AppResult<Json<Vec<JsonValue>>> {
    Ok(Json(state.cards.list_all().await?))
}

pub async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<JsonValue>> {
    Ok(Json(state.cards.get_by_id(&id).await?))
}

pub async fn search_cards(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> AppResult<Json<Vec<JsonValue>>> {
    let Query(pairs) = query?;
    let query = SearchQuery::from_pairs(pairs);
    Ok(Json(state.cards.search(query.text()).await?))
}

pub async fn update_card_price(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCardPriceRequest>, JsonRejection>,
) -> AppResult<Json<ApiMessage>> {
    let Json(payload) = payload?;
    let price = payload.validate()?;

    state.cards.set_price(&id, price).await?;

    Ok(Json(ApiMessage {
        success: true,
        message: "Card price updated successfully".to_string(),
    }))
}

pub async fn get_pricing(State(state): State<AppState>) -> AppResult<Json<JsonValue>> {
    Ok(Json(state.pricing.get_settings().await?))
}

pub async fn update_pricing(
    State(state): State<AppState>,
    payload: Result<Json<UpdatePricingRequest>, JsonRejection>,
) -> AppResult<Json<PricingUpdated>> {
    let Json(payload) = payload?;
    let update = payload.validate()?;

    let modified_count = state.pricing.update_settings(&update).await?;

    Ok(Json(PricingUpdated {
        success: true,
        message: "Pricing settings updated successfully".to_string(),
        modified_count,
    }))
}

pub async fn apply_rarity_pricing(
    State(state): State<AppState>,
    payload: Result<Json<ApplyRarityPricingRequest>, JsonRejection>,
) -> AppResult<Json<ApiMessage>> {
    let Json(payload) = payload?;
    let prices = payload.validate()?;

    let updated = state.pricing.apply_rarity_pricing(&prices).await?;

    Ok(Json(ApiMessage {
        success: true,
        message: format!("Prices updated for {updated} cards based on rarity"),
    }))
}
