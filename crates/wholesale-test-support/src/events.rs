//! Stored event builders.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use wholesale_core::repository::StoredEvent;

/// Builds a stored event with fresh identifiers.
#[must_use]
pub fn stored_event(
    aggregate_id: Uuid,
    sequence_number: i64,
    event_type: &str,
    payload: serde_json::Value,
    occurred_at: DateTime<Utc>,
) -> StoredEvent {
    let correlation_id = Uuid::new_v4();
    StoredEvent {
        event_id: Uuid::new_v4(),
        aggregate_id,
        event_type: event_type.to_owned(),
        payload,
        sequence_number,
        correlation_id,
        causation_id: correlation_id,
        occurred_at,
    }
}
