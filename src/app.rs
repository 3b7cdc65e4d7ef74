use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::{
    cors::{apply_cors, preflight},
    handlers::{
        apply_rarity_pricing, get_card, get_pricing, healthcheck, list_cards, search_cards,
        update_card_price, update_pricing,
    },
    state::AppState,
};

pub fn build_router(state: AppState) -> Router {
    let cors = state.cors.clone();

    Router::new()
        .route("/health", get(healthcheck))
        .route("/api/cards", get(list_cards).options(preflight))
        .route("/api/cards/search", get(search_cards).options(preflight))
        .route("/api/cards/{id}", get(get_card).options(preflight))
        .route(
            "/api/cards/{id}/price",
            put(update_card_price).options(preflight),
        )
        .route(
            "/api/admin/pricing",
            get(get_pricing).put(update_pricing).options(preflight),
        )
        .route(
            "/api/admin/apply-rarity-pricing",
            post(apply_rarity_pricing).options(preflight),
        )
        .layer(middleware::from_fn_with_state(cors, apply_cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
