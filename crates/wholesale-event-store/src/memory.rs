//! In-memory implementation of the `EventRepository` trait.
//!
//! Enforces the same optimistic concurrency rule as the `PostgreSQL`
//! store. Used when no database is configured and in tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;
use wholesale_core::error::DomainError;
use wholesale_core::repository::{EventRepository, StoredEvent};

#[derive(Debug, Default)]
struct Streams {
    by_aggregate: HashMap<Uuid, Vec<StoredEvent>>,
    // Aggregate ids in the order their streams were created.
    created: Vec<Uuid>,
}

/// Event repository held entirely in process memory.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    streams: Mutex<Streams>,
}

impl InMemoryEventRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Streams>, DomainError> {
        self.streams
            .lock()
            .map_err(|_| DomainError::Internal("event store lock poisoned".into()))
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self
            .lock()?
            .by_aggregate
            .get(&aggregate_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut streams = self.lock()?;
        let actual = streams
            .by_aggregate
            .get(&aggregate_id)
            .and_then(|stream| stream.last())
            .map_or(0, |event| event.sequence_number);
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }

        if !streams.by_aggregate.contains_key(&aggregate_id) {
            streams.created.push(aggregate_id);
        }
        streams
            .by_aggregate
            .entry(aggregate_id)
            .or_default()
            .extend_from_slice(events);
        Ok(())
    }

    async fn list_aggregate_ids(&self, event_type: &str) -> Result<Vec<Uuid>, DomainError> {
        let streams = self.lock()?;
        Ok(streams
            .created
            .iter()
            .filter(|id| {
                streams.by_aggregate.get(*id).is_some_and(|stream| {
                    stream.iter().any(|event| event.event_type == event_type)
                })
            })
            .copied()
            .collect())
    }
}
