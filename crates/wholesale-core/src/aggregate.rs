//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// Trait for aggregate roots that reconstitute from event history.
///
/// Domain methods record events and update state immediately; the version
/// only moves when events are applied from the store or marked committed.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the persisted version (number of stored events applied).
    ///
    /// This is the `expected_version` passed to
    /// [`EventRepository::append_events`](crate::repository::EventRepository::append_events).
    fn version(&self) -> i64;

    /// Apply a stored event to mutate internal state (used during reconstitution).
    fn apply(&mut self, event: &Self::Event);

    /// Returns uncommitted events produced by command handling.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Folds the uncommitted events into the persisted version once the
    /// store has accepted them.
    fn mark_committed(&mut self);
}
