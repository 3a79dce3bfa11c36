//! Cart domain model.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod ids;
pub mod quantity_guard;
pub mod reconciler;
