//! Test repositories: mock `EventRepository` implementations for tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;
use wholesale_core::error::DomainError;
use wholesale_core::repository::{EventRepository, StoredEvent};

/// An event repository that records every `append_events` call.
///
/// Loads return the seeded events plus everything appended so far for the
/// requested aggregate. Appends are not version-checked; use the in-memory
/// store for that.
#[derive(Debug, Default)]
pub struct RecordingEventRepository {
    seeded: Vec<StoredEvent>,
    appended: Mutex<Vec<(Uuid, i64, Vec<StoredEvent>)>>,
    failing_streams: HashSet<Uuid>,
}

impl RecordingEventRepository {
    /// Create a repository pre-loaded with `seeded` events.
    #[must_use]
    pub fn new(seeded: Vec<StoredEvent>) -> Self {
        Self {
            seeded,
            appended: Mutex::new(Vec::new()),
            failing_streams: HashSet::new(),
        }
    }

    /// Makes every append to `aggregate_id` fail with an internal error.
    #[must_use]
    pub fn with_failing_stream(mut self, aggregate_id: Uuid) -> Self {
        self.failing_streams.insert(aggregate_id);
        self
    }

    /// Returns a snapshot of all events that were appended.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_events(&self) -> Vec<(Uuid, i64, Vec<StoredEvent>)> {
        self.appended.lock().unwrap().clone()
    }

    /// Returns the appended events for one aggregate, flattened.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_to(&self, aggregate_id: Uuid) -> Vec<StoredEvent> {
        self.appended
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _, _)| *id == aggregate_id)
            .flat_map(|(_, _, events)| events.iter().cloned())
            .collect()
    }

    fn all_events(&self) -> Vec<StoredEvent> {
        let appended = self.appended.lock().unwrap();
        self.seeded
            .iter()
            .cloned()
            .chain(appended.iter().flat_map(|(_, _, events)| events.iter().cloned()))
            .collect()
    }
}

#[async_trait]
impl EventRepository for RecordingEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self
            .all_events()
            .into_iter()
            .filter(|event| event.aggregate_id == aggregate_id)
            .collect())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        if self.failing_streams.contains(&aggregate_id) {
            return Err(DomainError::Internal("connection reset".into()));
        }
        self.appended
            .lock()
            .unwrap()
            .push((aggregate_id, expected_version, events.to_vec()));
        Ok(())
    }

    async fn list_aggregate_ids(&self, event_type: &str) -> Result<Vec<Uuid>, DomainError> {
        let mut seen = HashSet::new();
        Ok(self
            .all_events()
            .into_iter()
            .filter(|event| event.event_type == event_type)
            .map(|event| event.aggregate_id)
            .filter(|id| seen.insert(*id))
            .collect())
    }
}

/// An event repository that always returns an empty event list and silently
/// accepts appends. Useful for testing "not found" scenarios and first
/// writes.
#[derive(Debug)]
pub struct EmptyEventRepository;

#[async_trait]
impl EventRepository for EmptyEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(vec![])
    }

    async fn append_events(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Ok(())
    }

    async fn list_aggregate_ids(&self, _event_type: &str) -> Result<Vec<Uuid>, DomainError> {
        Ok(vec![])
    }
}

/// An event repository that always returns an internal error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingEventRepository;

#[async_trait]
impl EventRepository for FailingEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Err(DomainError::Internal("connection refused".into()))
    }

    async fn append_events(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Err(DomainError::Internal("connection refused".into()))
    }

    async fn list_aggregate_ids(&self, _event_type: &str) -> Result<Vec<Uuid>, DomainError> {
        Err(DomainError::Internal("connection refused".into()))
    }
}

/// An event repository whose first `conflicts` appends fail with
/// `DomainError::ConcurrencyConflict`; later calls behave like
/// [`RecordingEventRepository`].
#[derive(Debug)]
pub struct ConflictingEventRepository {
    remaining: Mutex<u32>,
    attempts: Mutex<u32>,
    inner: RecordingEventRepository,
}

impl ConflictingEventRepository {
    /// Create a repository that rejects the first `conflicts` appends.
    #[must_use]
    pub fn new(conflicts: u32, seeded: Vec<StoredEvent>) -> Self {
        Self {
            remaining: Mutex::new(conflicts),
            attempts: Mutex::new(0),
            inner: RecordingEventRepository::new(seeded),
        }
    }

    /// Number of `append_events` calls received, including rejected ones.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn append_attempts(&self) -> u32 {
        *self.attempts.lock().unwrap()
    }

    /// Events that were accepted.
    pub fn appended_events(&self) -> Vec<(Uuid, i64, Vec<StoredEvent>)> {
        self.inner.appended_events()
    }
}

#[async_trait]
impl EventRepository for ConflictingEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        self.inner.load_events(aggregate_id).await
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        *self.attempts.lock().unwrap() += 1;
        {
            let mut remaining = self.remaining.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DomainError::ConcurrencyConflict {
                    aggregate_id,
                    expected: expected_version,
                    actual: expected_version + 1,
                });
            }
        }
        self.inner
            .append_events(aggregate_id, expected_version, events)
            .await
    }

    async fn list_aggregate_ids(&self, event_type: &str) -> Result<Vec<Uuid>, DomainError> {
        self.inner.list_aggregate_ids(event_type).await
    }
}
