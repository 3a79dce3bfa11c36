//! Wholesale API: HTTP surface for carts, checkout and order
//! administration.

pub mod config;
pub mod error;
pub mod owner;
pub mod routes;
pub mod state;
