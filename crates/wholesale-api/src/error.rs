//! Wholesale API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use wholesale_core::error::{DomainError, FieldViolation};

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying the schema migrations failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Per-field problems, for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldViolation>>,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            DomainError::InvalidQuantity { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_quantity")
            }
            DomainError::BelowMinimumOrderQuantity { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "below_minimum_order_quantity")
            }
            DomainError::ValidationFailed(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
            DomainError::EmptyCart(_) => (StatusCode::UNPROCESSABLE_ENTITY, "empty_cart"),
            DomainError::InvalidTransition { .. } => (StatusCode::CONFLICT, "invalid_transition"),
            DomainError::ConcurrencyConflict { .. } => {
                (StatusCode::CONFLICT, "concurrency_conflict")
            }
            DomainError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let message = if let DomainError::Internal(detail) = &self.0 {
            error!(error = %detail, "request failed");
            "internal server error".to_owned()
        } else {
            self.0.to_string()
        };

        let details = match self.0 {
            DomainError::ValidationFailed(violations) => Some(violations),
            _ => None,
        };

        let body = ErrorBody {
            error: error_code,
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::Value;
    use uuid::Uuid;

    fn status_of(err: DomainError) -> StatusCode {
        let response = ApiError(err).into_response();
        response.status()
    }

    async fn body_of(err: DomainError) -> Value {
        let response = ApiError(err).into_response();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(
            status_of(DomainError::not_found("order", Uuid::new_v4())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_quantity_errors_map_to_422() {
        assert_eq!(
            status_of(DomainError::InvalidQuantity { quantity: 0 }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(DomainError::BelowMinimumOrderQuantity {
                minimum: 5,
                requested: 3,
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_empty_cart_maps_to_422() {
        assert_eq!(
            status_of(DomainError::EmptyCart(Uuid::new_v4())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_conflicts_map_to_409() {
        assert_eq!(
            status_of(DomainError::ConcurrencyConflict {
                aggregate_id: Uuid::new_v4(),
                expected: 1,
                actual: 2,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::InvalidTransition {
                from: "delivered".into(),
                to: "processing".into(),
            }),
            StatusCode::CONFLICT
        );
    }

    #[tokio::test]
    async fn test_validation_failure_lists_fields() {
        let json = body_of(DomainError::ValidationFailed(vec![FieldViolation::new(
            "phone",
            "must be 10 digits starting with 6-9 and not all the same digit",
        )]))
        .await;

        assert_eq!(json["error"], "validation_failed");
        assert_eq!(json["details"][0]["field"], "phone");
    }

    #[tokio::test]
    async fn test_below_moq_message_names_the_minimum() {
        let json = body_of(DomainError::BelowMinimumOrderQuantity {
            minimum: 10,
            requested: 4,
        })
        .await;

        assert_eq!(json["message"], "minimum order quantity is 10");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_storage_detail() {
        let response = ApiError(DomainError::Internal("event store: pool timed out".into()))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(json["error"], "internal_error");
        assert_eq!(json["message"], "internal server error");
    }
}
