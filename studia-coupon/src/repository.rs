use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::engine::RedeemOutcome;
use crate::models::Coupon;

/// Repository trait for coupon data access. `redeem_if_available` is the
/// only mutation concurrent orders contend on; implementations must make
/// the limit check, the ledger append and the counter increment one
/// atomic conditional write.
#[async_trait]
pub trait CouponRepository: Send + Sync {
    async fn find(
        &self,
        code: &str,
    ) -> Result<Option<Coupon>, Box<dyn std::error::Error + Send + Sync>>;

    async fn insert(
        &self,
        coupon: Coupon,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Atomically redeem one use: re-check active/window/global/per-user
    /// limits and the minimum purchase against current state and, only if
    /// all pass, append a ledger entry and increment `usage_count`.
    /// Concurrent calls on the last remaining use must yield exactly one
    /// `Redeemed`.
    async fn redeem_if_available(
        &self,
        code: &str,
        user_id: Uuid,
        order_id: Uuid,
        cart_total_cents: i64,
        now: DateTime<Utc>,
    ) -> Result<RedeemOutcome, Box<dyn std::error::Error + Send + Sync>>;
}
