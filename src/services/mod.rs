//! Stateless services sitting between the HTTP handlers and the store.
//!
//! Every service owns only `Arc` handles to repositories, so cloning one per
//! request is cheap and no in-process state is shared beyond the store.

pub mod cards;
pub mod pricing;

pub use cards::{CardService, SEARCH_LIMIT, parse_card_id};
pub use pricing::{PricingService, default_pricing_document};
