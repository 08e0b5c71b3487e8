use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use studia_catalog::{CatalogItem, ItemKind};
use studia_core::{PaymentDetails, PaymentMethod};
use studia_coupon::{ApplicabilityScope, Coupon, DiscountType};
use studia_order::CompletionSource;
use uuid::Uuid;

use crate::auth::require_admin;
use crate::error::AppError;
use crate::orders::CompletionResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub reference: Option<String>,
}

/// POST /v1/admin/orders/{id}/confirm-payment
/// An operator marks an order paid after manual review. Converges on the
/// same transition as the other payment paths.
pub async fn confirm_payment(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<Json<CompletionResponse>, AppError> {
    require_admin(&headers, &state)?;
    let payment = PaymentDetails::verified(PaymentMethod::Manual, req.reference, Utc::now());
    let outcome = state
        .ledger
        .complete(order_id, payment, CompletionSource::AdminConfirm)
        .await?;
    Ok(Json(outcome.into()))
}

/// POST /v1/admin/orders/{id}/refund
pub async fn refund_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<CompletionResponse>, AppError> {
    require_admin(&headers, &state)?;
    let outcome = state.ledger.refund(order_id).await?;
    Ok(Json(outcome.into()))
}

#[derive(Debug, Deserialize)]
pub struct CreateCouponRequest {
    pub code: String,
    pub discount: DiscountType,
    #[serde(default)]
    pub min_purchase_cents: i64,
    pub scope: Option<ApplicabilityScope>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<u32>,
    pub user_limit: Option<u32>,
}

/// POST /v1/admin/coupons
pub async fn create_coupon(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateCouponRequest>,
) -> Result<(StatusCode, Json<Coupon>), AppError> {
    require_admin(&headers, &state)?;

    let mut coupon = Coupon::new(&req.code, req.discount);
    coupon.min_purchase_cents = req.min_purchase_cents;
    if let Some(scope) = req.scope {
        coupon.scope = scope;
    }
    coupon.starts_at = req.starts_at;
    coupon.ends_at = req.ends_at;
    coupon.usage_limit = req.usage_limit;
    if let Some(user_limit) = req.user_limit {
        coupon.user_limit = user_limit;
    }

    state
        .coupon_repo
        .insert(coupon.clone())
        .await
        .map_err(|e| AppError::Anyhow(anyhow::anyhow!(e.to_string())))?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

#[derive(Debug, Deserialize)]
pub struct CreateCatalogItemRequest {
    pub kind: ItemKind,
    pub title: String,
    pub price_cents: i64,
}

/// POST /v1/admin/catalog-items
/// Seeding endpoint; the real catalog lives in the surrounding platform.
pub async fn create_catalog_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateCatalogItemRequest>,
) -> Result<(StatusCode, Json<CatalogItem>), AppError> {
    require_admin(&headers, &state)?;
    let item = CatalogItem::new(req.kind, req.title, req.price_cents);
    state.catalog.insert(item.clone()).await;
    Ok((StatusCode::CREATED, Json(item)))
}
