use async_trait::async_trait;
use studia_core::PaymentDetails;
use uuid::Uuid;

use crate::models::{Order, OrderStatus};

/// What a conditional status update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The guard matched; the status was flipped.
    Applied { from: OrderStatus },
    /// The order was not in any of the permitted source states. Carries
    /// the status the order was observed in.
    Noop { current: OrderStatus },
}

/// Repository trait for order data access. `transition_status` is the
/// linearization point of the payment lifecycle: it must be a single
/// conditional update ("set status where status in ...") so racing
/// completion paths see exactly one winner.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert(
        &self,
        order: &Order,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// Conditionally move the order to `to` if its current status is in
    /// `from`. When the guard matches and payment details are supplied,
    /// they are recorded in the same write. Returns `Ok(None)` if no such
    /// order exists.
    async fn transition_status(
        &self,
        id: Uuid,
        from: &[OrderStatus],
        to: OrderStatus,
        payment: Option<PaymentDetails>,
    ) -> Result<Option<TransitionOutcome>, Box<dyn std::error::Error + Send + Sync>>;

    /// Re-price an order whose coupon could not be redeemed: overwrite
    /// discount/total and drop the coupon code.
    async fn update_pricing(
        &self,
        id: Uuid,
        discount_cents: i64,
        total_cents: i64,
        coupon_code: Option<String>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;
}
