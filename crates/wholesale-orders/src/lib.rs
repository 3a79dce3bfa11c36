//! Wholesale: Orders bounded context.
//!
//! Turns a cart into an immutable order at checkout and tracks the
//! order's fulfilment status afterwards.

pub mod application;
pub mod domain;
