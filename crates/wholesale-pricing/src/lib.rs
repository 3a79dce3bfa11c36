//! Wholesale Pricing: money and the cart pricing calculator.
//!
//! Everything in this crate is pure: no I/O, no clocks, no persistence.
//! Line items are priced from their own snapshotted fields so that a cart
//! view and a placed order always agree on how a line was computed.

pub mod calculator;
pub mod line_item;
pub mod money;
pub mod tax;

pub use calculator::{
    FLAT_SHIPPING_FEE, FREE_SHIPPING_THRESHOLD, LineCharge, PriceBreakdown, PricingPolicy,
    line_tax, line_total, subtotal,
};
pub use line_item::{LineItem, PriceTier, ProductSnapshot};
pub use money::Money;
pub use tax::{TaxRate, TaxType};
