//! Domain error types.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// A single rejected input field, rendered to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Name of the offending field.
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

impl FieldViolation {
    /// Creates a new violation for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A cart, line item, order, or owner context was not found.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Kind of thing that was looked up.
        resource: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// A requested quantity was zero, negative or too large to hold.
    #[error("invalid quantity {quantity}: must be between 1 and {max}", max = u32::MAX)]
    InvalidQuantity {
        /// The rejected quantity.
        quantity: i64,
    },

    /// A quantity would drop below the line item's minimum order quantity.
    #[error("minimum order quantity is {minimum}")]
    BelowMinimumOrderQuantity {
        /// The line item's minimum order quantity.
        minimum: u32,
        /// The quantity that was rejected.
        requested: i64,
    },

    /// One or more input fields failed validation.
    #[error("validation failed: {}", summarize(.0))]
    ValidationFailed(Vec<FieldViolation>),

    /// Checkout was attempted on a cart with no items.
    #[error("cart is empty for owner {0}")]
    EmptyCart(Uuid),

    /// An order status change is not allowed by the state machine.
    #[error("invalid order status transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// Optimistic concurrency conflict.
    #[error(
        "concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// A persistence or serialization failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Shorthand for [`DomainError::NotFound`].
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}
