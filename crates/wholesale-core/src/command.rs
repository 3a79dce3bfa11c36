//! Command abstractions.

use uuid::Uuid;

/// A request to change one cart or order.
///
/// The correlation id is copied onto every event the command produces.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Dotted command name, e.g. `cart.add_item`, used in logs.
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;
}
