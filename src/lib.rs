// ============================================================================
// Lorcana Card Shop backend
// ============================================================================
//
// REST API over the shop's MongoDB collections: card listing, lookup and
// search, per-card price edits, and the admin pricing schedule (premium
// pack price, shipping table, rarity table) with bulk repricing by rarity.

pub mod app;
pub mod config;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod services;
pub mod state;
pub mod store;

pub use app::build_router;
pub use error::{AppError, AppResult};
pub use state::AppState;
