//! Shared application state.

use std::sync::Arc;

use wholesale_core::clock::Clock;
use wholesale_core::repository::EventRepository;
use wholesale_pricing::PricingPolicy;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock used to stamp events.
    pub clock: Arc<dyn Clock>,
    /// Event store backing carts and orders.
    pub event_repository: Arc<dyn EventRepository>,
    /// Shipping rules applied to every cart and order.
    pub pricing: PricingPolicy,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        event_repository: Arc<dyn EventRepository>,
        pricing: PricingPolicy,
    ) -> Self {
        Self {
            clock,
            event_repository,
            pricing,
        }
    }
}
