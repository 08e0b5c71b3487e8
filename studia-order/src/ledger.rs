use std::sync::Arc;

use serde::{Deserialize, Serialize};
use studia_catalog::{CatalogError, CatalogLookup, ItemKind, PricedLine};
use studia_core::{Clock, NotificationDispatcher, NotificationEvent, PaymentDetails};
use studia_coupon::{CouponEngine, CouponError, RedeemOutcome};
use studia_enrollment::EnrollmentActivator;
use uuid::Uuid;

use crate::models::{Order, OrderItem, OrderStatus};
use crate::repository::{OrderRepository, TransitionOutcome};

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("Catalog item not found: {0}")]
    ItemNotFound(Uuid),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error("Invalid state transition from {from:?} to {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order storage failure: {0}")]
    Storage(String),
}

/// One unresolved cart line as submitted by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub kind: ItemKind,
    pub reference_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Which payment-completion entry point fired. All three funnel through
/// the same transition; the source only matters for the audit trail.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionSource {
    SelfReport,
    AdminConfirm,
    Gateway,
}

/// Result of a completion or failure attempt. `AlreadyFinal` is the
/// re-entry guard: the order was in a terminal state and no side effects
/// were re-applied.
#[derive(Debug)]
pub enum CompletionOutcome {
    Completed(Order),
    Failed(Order),
    Refunded(Order),
    AlreadyFinal(OrderStatus),
}

#[derive(Debug, Clone)]
pub struct PricingPolicy {
    /// Derived tax, applied to the undiscounted subtotal. Current policy
    /// is a flat 10%.
    pub tax_rate: f64,
    pub currency: String,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate: 0.10,
            currency: "INR".to_string(),
        }
    }
}

/// Owns the order lifecycle: creation with computed money fields, and the
/// single idempotent transition all payment paths converge on.
pub struct OrderLedger {
    orders: Arc<dyn OrderRepository>,
    catalog: Arc<dyn CatalogLookup>,
    coupons: Arc<CouponEngine>,
    activator: Arc<EnrollmentActivator>,
    notifier: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
    policy: PricingPolicy,
}

impl OrderLedger {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        catalog: Arc<dyn CatalogLookup>,
        coupons: Arc<CouponEngine>,
        activator: Arc<EnrollmentActivator>,
        notifier: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
        policy: PricingPolicy,
    ) -> Self {
        Self {
            orders,
            catalog,
            coupons,
            activator,
            notifier,
            clock,
            policy,
        }
    }

    /// Resolve a submitted cart against the catalog. Shared by order
    /// creation and the standalone coupon-validate endpoint.
    pub async fn price_cart(&self, cart: &[CartLine]) -> Result<Vec<PricedLine>, OrderError> {
        let mut priced = Vec::with_capacity(cart.len());
        for line in cart {
            let item = self
                .catalog
                .get_price(line.kind, line.reference_id)
                .await
                .map_err(|CatalogError::NotFound(id)| OrderError::ItemNotFound(id))?;
            priced.push(PricedLine {
                kind: line.kind,
                reference_id: item.id,
                title: item.title,
                unit_price_cents: item.price_cents,
                quantity: line.quantity,
            });
        }
        Ok(priced)
    }

    /// Create a pending order: resolve current prices, freeze them as line
    /// items, derive subtotal/tax, and validate (never redeem) an optional
    /// coupon, storing the resulting discount amount.
    pub async fn create(
        &self,
        user_id: Uuid,
        cart: &[CartLine],
        coupon_code: Option<&str>,
    ) -> Result<Order, OrderError> {
        let priced = self.price_cart(cart).await?;

        let quote = match coupon_code {
            Some(code) => Some(self.coupons.validate(code, &priced, Some(user_id)).await?),
            None => None,
        };

        let items: Vec<OrderItem> = priced.into_iter().map(OrderItem::from).collect();
        let mut order = Order::new(
            user_id,
            items,
            self.policy.tax_rate,
            &self.policy.currency,
            self.clock.now(),
        );
        if let Some(quote) = quote {
            order.apply_discount(quote.code, quote.discount_cents);
        }

        self.orders
            .insert(&order)
            .await
            .map_err(|e| OrderError::Storage(e.to_string()))?;
        tracing::info!(order_number = %order.order_number, user_id = %order.user_id, total_cents = order.total_cents, "order created");
        Ok(order)
    }

    pub async fn get(&self, order_id: Uuid) -> Result<Order, OrderError> {
        self.orders
            .get(order_id)
            .await
            .map_err(|e| OrderError::Storage(e.to_string()))?
            .ok_or(OrderError::NotFound(order_id))
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, OrderError> {
        self.orders
            .list_for_user(user_id)
            .await
            .map_err(|e| OrderError::Storage(e.to_string()))
    }

    /// Move a pending order into Processing before an external charge is
    /// attempted. Returns the status the order is in afterwards; terminal
    /// orders are left untouched.
    pub async fn begin_processing(&self, order_id: Uuid) -> Result<OrderStatus, OrderError> {
        let outcome = self
            .orders
            .transition_status(order_id, &[OrderStatus::Pending], OrderStatus::Processing, None)
            .await
            .map_err(|e| OrderError::Storage(e.to_string()))?
            .ok_or(OrderError::NotFound(order_id))?;
        Ok(match outcome {
            TransitionOutcome::Applied { .. } => OrderStatus::Processing,
            TransitionOutcome::Noop { current } => current,
        })
    }

    /// The single completion transition all three payment paths call.
    ///
    /// The status flip is the linearization point: it only fires from
    /// Pending or Processing, so concurrent completion attempts see exactly
    /// one winner and the losers take the no-op path with no side effects.
    /// After the flip, coupon redemption, enrollment activation and the
    /// notification are each attempted; every one of them is individually
    /// safe to retry and none of them can undo the completed status.
    pub async fn complete(
        &self,
        order_id: Uuid,
        payment: PaymentDetails,
        source: CompletionSource,
    ) -> Result<CompletionOutcome, OrderError> {
        let outcome = self
            .orders
            .transition_status(
                order_id,
                &[OrderStatus::Pending, OrderStatus::Processing],
                OrderStatus::Completed,
                Some(payment),
            )
            .await
            .map_err(|e| OrderError::Storage(e.to_string()))?
            .ok_or(OrderError::NotFound(order_id))?;

        let from = match outcome {
            TransitionOutcome::Applied { from } => from,
            TransitionOutcome::Noop { current } => {
                tracing::info!(%order_id, ?current, ?source, "completion re-entry, returning current state");
                return Ok(CompletionOutcome::AlreadyFinal(current));
            }
        };
        tracing::info!(%order_id, ?from, ?source, "order completed");

        let mut order = self.get(order_id).await?;

        // (b) Redeem the coupon if the order carries a discount. The pool
        // may have drained since validation; in that case the order
        // proceeds at full price and is re-priced before we report it.
        if order.discount_cents > 0 {
            if let Some(code) = order.coupon_code.clone() {
                match self
                    .coupons
                    .redeem(&code, order.user_id, order.id, order.subtotal_cents)
                    .await
                {
                    Ok(RedeemOutcome::Redeemed) => {
                        self.dispatch(
                            NotificationEvent::CouponRedeemed,
                            serde_json::json!({
                                "code": code,
                                "order_id": order.id,
                                "user_id": order.user_id,
                            }),
                        )
                        .await;
                    }
                    Ok(RedeemOutcome::Rejected(reason)) => {
                        tracing::warn!(%order_id, %code, %reason, "coupon no longer redeemable, completing at full price");
                        order.clear_discount();
                        self.orders
                            .update_pricing(order.id, 0, order.total_cents, None)
                            .await
                            .map_err(|e| OrderError::Storage(e.to_string()))?;
                    }
                    Err(e) => {
                        // The order stays completed; redemption is guarded
                        // by its own limit checks and can be retried.
                        tracing::error!(%order_id, %code, error = %e, "coupon redemption errored");
                    }
                }
            }
        }

        // (c) Grant course access. Idempotent upsert keyed on
        // (user, course); a failure here is operator-visible, not fatal to
        // the completed order.
        let grants = order.course_grants();
        if !grants.is_empty() {
            match self
                .activator
                .activate(order.user_id, &grants, self.clock.now())
                .await
            {
                Ok(outcomes) => {
                    self.dispatch(
                        NotificationEvent::EnrollmentActivated,
                        serde_json::json!({
                            "order_id": order.id,
                            "user_id": order.user_id,
                            "courses": outcomes.iter().map(|(id, _)| id).collect::<Vec<_>>(),
                        }),
                    )
                    .await;
                }
                Err(e) => {
                    tracing::error!(%order_id, user_id = %order.user_id, error = %e, "enrollment activation failed after payment");
                }
            }
        }

        // (d) Tell the outside world. Never blocks or rolls back.
        self.dispatch(
            NotificationEvent::OrderCompleted,
            serde_json::json!({
                "order_id": order.id,
                "order_number": order.order_number,
                "user_id": order.user_id,
                "total_cents": order.total_cents,
            }),
        )
        .await;

        Ok(CompletionOutcome::Completed(order))
    }

    /// Mark a payment attempt as failed. Terminal; no redemption, no
    /// enrollment. Re-entry on a terminal order is a no-op.
    pub async fn fail(&self, order_id: Uuid) -> Result<CompletionOutcome, OrderError> {
        let outcome = self
            .orders
            .transition_status(
                order_id,
                &[OrderStatus::Pending, OrderStatus::Processing],
                OrderStatus::Failed,
                None,
            )
            .await
            .map_err(|e| OrderError::Storage(e.to_string()))?
            .ok_or(OrderError::NotFound(order_id))?;

        match outcome {
            TransitionOutcome::Noop { current } => Ok(CompletionOutcome::AlreadyFinal(current)),
            TransitionOutcome::Applied { from } => {
                tracing::warn!(%order_id, ?from, "order marked failed");
                let order = self.get(order_id).await?;
                self.dispatch(
                    NotificationEvent::OrderFailed,
                    serde_json::json!({ "order_id": order.id, "user_id": order.user_id }),
                )
                .await;
                Ok(CompletionOutcome::Failed(order))
            }
        }
    }

    /// Refund a completed order. Only reachable from Completed; re-refund
    /// is a no-op.
    pub async fn refund(&self, order_id: Uuid) -> Result<CompletionOutcome, OrderError> {
        let outcome = self
            .orders
            .transition_status(
                order_id,
                &[OrderStatus::Completed],
                OrderStatus::Refunded,
                None,
            )
            .await
            .map_err(|e| OrderError::Storage(e.to_string()))?
            .ok_or(OrderError::NotFound(order_id))?;

        match outcome {
            TransitionOutcome::Applied { .. } => {
                let order = self.get(order_id).await?;
                self.dispatch(
                    NotificationEvent::OrderRefunded,
                    serde_json::json!({ "order_id": order.id, "user_id": order.user_id }),
                )
                .await;
                Ok(CompletionOutcome::Refunded(order))
            }
            TransitionOutcome::Noop {
                current: OrderStatus::Refunded,
            } => Ok(CompletionOutcome::AlreadyFinal(OrderStatus::Refunded)),
            TransitionOutcome::Noop { current } => Err(OrderError::InvalidTransition {
                from: current,
                to: OrderStatus::Refunded,
            }),
        }
    }

    async fn dispatch(&self, event: NotificationEvent, payload: serde_json::Value) {
        if let Err(e) = self.notifier.notify(event, payload).await {
            tracing::warn!(?event, error = %e, "notification dispatch failed");
        }
    }
}
