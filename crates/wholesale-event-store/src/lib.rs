//! Event stores for the wholesale cart engine.

pub mod memory;
pub mod pg_event_repository;

pub use memory::InMemoryEventRepository;
pub use pg_event_repository::PgEventRepository;

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");
