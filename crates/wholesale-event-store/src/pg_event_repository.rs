//! `PostgreSQL` implementation of the `EventRepository` trait.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, Row, query, query_as, query_scalar};
use tracing::debug;
use uuid::Uuid;
use wholesale_core::error::DomainError;
use wholesale_core::repository::{EventRepository, StoredEvent};

const LOAD_EVENTS_SQL: &str = r"
SELECT event_id, aggregate_id, event_type, payload, sequence_number,
       correlation_id, causation_id, occurred_at
FROM domain_events
WHERE aggregate_id = $1
ORDER BY sequence_number
";

const CURRENT_VERSION_SQL: &str =
    "SELECT COALESCE(MAX(sequence_number), 0) FROM domain_events WHERE aggregate_id = $1";

const INSERT_EVENT_SQL: &str = r"
INSERT INTO domain_events (
    event_id, aggregate_id, event_type, payload, sequence_number,
    correlation_id, causation_id, occurred_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
";

const LIST_AGGREGATE_IDS_SQL: &str = r"
SELECT aggregate_id
FROM domain_events
WHERE event_type = $1
GROUP BY aggregate_id
ORDER BY MIN(occurred_at), aggregate_id
";

/// PostgreSQL-backed event repository.
#[derive(Debug, Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    /// Creates a new `PgEventRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_version(&self, aggregate_id: Uuid) -> Result<i64, DomainError> {
        query_scalar::<Postgres, i64>(CURRENT_VERSION_SQL)
            .bind(aggregate_id)
            .fetch_one(&self.pool)
            .await
            .map_err(internal)
    }
}

struct EventRow(StoredEvent);

impl<'r> FromRow<'r, PgRow> for EventRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(StoredEvent {
            event_id: row.try_get("event_id")?,
            aggregate_id: row.try_get("aggregate_id")?,
            event_type: row.try_get("event_type")?,
            payload: row.try_get("payload")?,
            sequence_number: row.try_get("sequence_number")?,
            correlation_id: row.try_get("correlation_id")?,
            causation_id: row.try_get("causation_id")?,
            occurred_at: row.try_get("occurred_at")?,
        }))
    }
}

fn internal(e: sqlx::Error) -> DomainError {
    DomainError::Internal(format!("event store: {e}"))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let rows = query_as::<Postgres, EventRow>(LOAD_EVENTS_SQL)
            .bind(aggregate_id)
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;
        Ok(rows.into_iter().map(|row| row.0).collect())
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

        let mut tx = self.pool.begin().await.map_err(internal)?;

        let actual = query_scalar::<Postgres, i64>(CURRENT_VERSION_SQL)
            .bind(aggregate_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(internal)?;
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }

        for event in events {
            let inserted = query(INSERT_EVENT_SQL)
                .bind(event.event_id)
                .bind(aggregate_id)
                .bind(&event.event_type)
                .bind(&event.payload)
                .bind(event.sequence_number)
                .bind(event.correlation_id)
                .bind(event.causation_id)
                .bind(event.occurred_at)
                .execute(&mut *tx)
                .await;

            // A concurrent writer got the same sequence numbers in first.
            if let Err(e) = inserted {
                if is_unique_violation(&e) {
                    drop(tx);
                    let actual = self.current_version(aggregate_id).await?;
                    debug!(%aggregate_id, expected_version, actual, "append lost race");
                    return Err(DomainError::ConcurrencyConflict {
                        aggregate_id,
                        expected: expected_version,
                        actual,
                    });
                }
                return Err(internal(e));
            }
        }

        tx.commit().await.map_err(internal)
    }

    async fn list_aggregate_ids(&self, event_type: &str) -> Result<Vec<Uuid>, DomainError> {
        query_scalar::<Postgres, Uuid>(LIST_AGGREGATE_IDS_SQL)
            .bind(event_type)
            .fetch_all(&self.pool)
            .await
            .map_err(internal)
    }
}
