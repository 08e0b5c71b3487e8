use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use studia_order::CartLine;

use crate::auth::optional_user;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    pub code: String,
    pub cart: Vec<CartLine>,
}

#[derive(Debug, Serialize)]
pub struct ValidateCouponResponse {
    pub valid: bool,
    pub code: String,
    pub cart_total_cents: i64,
    pub discount_cents: i64,
    pub final_total_cents: i64,
}

/// POST /v1/coupons/validate
/// Read-only pre-checkout validation; safe to call repeatedly. Rejections
/// surface the reason and the computed cart total (422).
pub async fn validate_coupon(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ValidateCouponRequest>,
) -> Result<Json<ValidateCouponResponse>, AppError> {
    let priced = state.ledger.price_cart(&req.cart).await?;
    let quote = state
        .coupons
        .validate(&req.code, &priced, optional_user(&headers))
        .await?;

    Ok(Json(ValidateCouponResponse {
        valid: true,
        code: quote.code,
        cart_total_cents: quote.cart_total_cents,
        discount_cents: quote.discount_cents,
        final_total_cents: quote.final_total_cents,
    }))
}
