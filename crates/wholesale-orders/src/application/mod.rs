//! Orders application services.

pub mod checkout;
pub mod command_handlers;
pub mod query_handlers;
