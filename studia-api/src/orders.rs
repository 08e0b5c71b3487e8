use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use studia_core::{PaymentDetails, PaymentMethod, PaymentStatus};
use studia_order::{CartLine, CompletionOutcome, CompletionSource, Order, OrderStatus};
use uuid::Uuid;

use crate::auth::UserId;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<CartLine>,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    /// External transaction reference (UTR etc.) the customer self-reports.
    pub reference: Option<String>,
    pub proof_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub status: OrderStatus,
    pub already_final: bool,
    pub order: Option<Order>,
}

impl From<CompletionOutcome> for CompletionResponse {
    fn from(outcome: CompletionOutcome) -> Self {
        match outcome {
            CompletionOutcome::Completed(order) => Self {
                status: order.status,
                already_final: false,
                order: Some(order),
            },
            CompletionOutcome::Failed(order) => Self {
                status: order.status,
                already_final: false,
                order: Some(order),
            },
            CompletionOutcome::Refunded(order) => Self {
                status: order.status,
                already_final: false,
                order: Some(order),
            },
            CompletionOutcome::AlreadyFinal(status) => Self {
                status,
                already_final: true,
                order: None,
            },
        }
    }
}

/// POST /v1/orders
/// Create a pending order from a cart, validating (never redeeming) an
/// optional coupon.
pub async fn create_order(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    if req.items.is_empty() {
        return Err(AppError::ValidationError("Cart is empty".to_string()));
    }
    let order = state
        .ledger
        .create(user_id, &req.items, req.coupon_code.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /v1/orders
pub async fn list_orders(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.ledger.list_for_user(user_id).await?))
}

/// GET /v1/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = owned_order(&state, order_id, user_id).await?;
    Ok(Json(order))
}

/// POST /v1/orders/{id}/verify-payment
/// Self-report path: the customer submits a transaction reference, treated
/// as auto-verified under current policy.
pub async fn verify_payment(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(order_id): Path<Uuid>,
    Json(req): Json<VerifyPaymentRequest>,
) -> Result<Json<CompletionResponse>, AppError> {
    owned_order(&state, order_id, user_id).await?;

    let mut payment =
        PaymentDetails::verified(PaymentMethod::Upi, req.reference, chrono::Utc::now());
    payment.proof_url = req.proof_url;

    let outcome = state
        .ledger
        .complete(order_id, payment, CompletionSource::SelfReport)
        .await?;
    Ok(Json(outcome.into()))
}

/// POST /v1/orders/{id}/checkout
/// Simulated gateway path: synchronous charge with a probabilistic
/// outcome. A decline marks the order failed and returns a generic
/// payment-failed body.
pub async fn checkout(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(order_id): Path<Uuid>,
) -> Result<Json<CompletionResponse>, AppError> {
    let order = owned_order(&state, order_id, user_id).await?;

    let status = state.ledger.begin_processing(order_id).await?;
    if status.is_terminal() {
        return Ok(Json(CompletionResponse {
            status,
            already_final: true,
            order: None,
        }));
    }

    let charge = state
        .gateway
        .charge(order.id, order.total_cents, &order.currency)
        .await
        .map_err(|e| {
            tracing::error!(%order_id, error = %e, "gateway charge errored");
            AppError::PaymentFailed
        })?;

    match charge {
        PaymentStatus::Succeeded => {
            let payment = PaymentDetails::verified(
                PaymentMethod::Gateway,
                Some(format!("sim_{}", Uuid::new_v4().simple())),
                chrono::Utc::now(),
            );
            let outcome = state
                .ledger
                .complete(order_id, payment, CompletionSource::Gateway)
                .await?;
            Ok(Json(outcome.into()))
        }
        PaymentStatus::Failed | PaymentStatus::Processing => {
            state.ledger.fail(order_id).await?;
            Err(AppError::PaymentFailed)
        }
    }
}

/// Load an order and enforce that the caller owns it.
async fn owned_order(
    state: &AppState,
    order_id: Uuid,
    user_id: Uuid,
) -> Result<Order, AppError> {
    let order = state.ledger.get(order_id).await?;
    if order.user_id != user_id {
        return Err(AppError::AuthorizationError(
            "Order belongs to another user".to_string(),
        ));
    }
    Ok(order)
}
