//! Orders domain model.

pub mod address;
pub mod aggregates;
pub mod commands;
pub mod events;
pub mod status;
