//! Shared test mocks and utilities for the wholesale cart engine.

mod clock;
mod events;
mod repository;

pub use clock::FixedClock;
pub use events::stored_event;
pub use repository::{
    ConflictingEventRepository, EmptyEventRepository, FailingEventRepository,
    RecordingEventRepository,
};
