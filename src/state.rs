use crate::{
    cors::CorsPolicy,
    services::{CardService, PricingService},
    store::Store,
};

#[derive(Clone)]
pub struct AppState {
    pub cards: CardService,
    pub pricing: PricingService,
    pub cors: CorsPolicy,
}

impl AppState {
    pub fn new(store: Store, cors: CorsPolicy) -> Self {
        Self {
            cards: CardService::new(store.cards.clone()),
            pricing: PricingService::new(store.cards, store.pricing),
            cors,
        }
    }
}
