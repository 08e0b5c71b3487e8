use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::extract::FromRequestParts;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller identity, taken from the `X-User-Id` header. The
/// surrounding platform terminates real authentication upstream; this
/// subsystem only needs a stable user id to enforce ownership.
pub struct UserId(pub Uuid);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        optional_user(&parts.headers).map(UserId).ok_or_else(|| {
            AppError::AuthenticationError("Missing or invalid X-User-Id header".to_string())
        })
    }
}

pub fn optional_user(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
}

/// Admin routes are gated by a shared operator key.
pub fn require_admin(headers: &HeaderMap, state: &AppState) -> Result<(), AppError> {
    let presented = headers.get("x-admin-key").and_then(|value| value.to_str().ok());
    if presented == Some(state.auth.admin_key.as_str()) {
        Ok(())
    } else {
        Err(AppError::AuthorizationError("Admin key required".to_string()))
    }
}
