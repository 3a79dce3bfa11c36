//! Wholesale: Cart bounded context.
//!
//! Responsible for the one active cart each customer owns: merging
//! repeated adds into a single line, enforcing minimum order quantities,
//! and persisting every change under optimistic concurrency.

pub mod application;
pub mod domain;
