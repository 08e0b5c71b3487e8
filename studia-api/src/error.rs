use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use studia_core::RejectionReason;
use studia_coupon::CouponError;
use studia_order::OrderError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    /// Coupon validation rejection: reason plus the computed cart total so
    /// the client can explain why the code did not apply.
    CouponRejected {
        reason: RejectionReason,
        cart_total_cents: i64,
    },
    /// Generic payment failure, no internal detail exposed.
    PaymentFailed,
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::AuthenticationError(msg) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": msg }))).into_response()
            }
            AppError::AuthorizationError(msg) => {
                (StatusCode::FORBIDDEN, Json(json!({ "error": msg }))).into_response()
            }
            AppError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            AppError::NotFoundError(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            AppError::CouponRejected {
                reason,
                cart_total_cents,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "valid": false,
                    "reason": reason,
                    "message": reason.to_string(),
                    "cart_total_cents": cart_total_cents,
                })),
            )
                .into_response(),
            AppError::PaymentFailed => (
                StatusCode::PAYMENT_REQUIRED,
                Json(json!({ "error": "Payment failed" })),
            )
                .into_response(),
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<CouponError> for AppError {
    fn from(err: CouponError) -> Self {
        match err {
            CouponError::Rejected {
                reason,
                cart_total_cents,
            } => AppError::CouponRejected {
                reason,
                cart_total_cents,
            },
            CouponError::Storage(msg) => AppError::Anyhow(anyhow::anyhow!(msg)),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound(id) => AppError::NotFoundError(format!("Order not found: {id}")),
            OrderError::ItemNotFound(id) => {
                AppError::NotFoundError(format!("Catalog item not found: {id}"))
            }
            OrderError::Coupon(coupon_err) => coupon_err.into(),
            OrderError::InvalidTransition { from, to } => AppError::ValidationError(format!(
                "Invalid state transition from {from:?} to {to:?}"
            )),
            OrderError::Storage(msg) => AppError::Anyhow(anyhow::anyhow!(msg)),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}
