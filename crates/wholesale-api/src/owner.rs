//! Per-request owner context.
//!
//! The upstream auth layer authenticates the customer and forwards their id
//! in the `x-owner-id` header. Handlers take the id from here and nowhere
//! else.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;
use wholesale_core::error::DomainError;

use crate::error::ApiError;

/// Header carrying the authenticated owner id.
pub const OWNER_HEADER: &str = "x-owner-id";

/// The customer a request acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerContext(pub Uuid);

impl<S> FromRequestParts<S> for OwnerContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(Self)
            .ok_or_else(|| ApiError(DomainError::not_found("owner session", OWNER_HEADER)))
    }
}
