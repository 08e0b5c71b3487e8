use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use studia_core::RejectionReason;
use studia_coupon::{Coupon, CouponRepository, RedeemOutcome, UsageRecord};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory coupon store. Redemption holds the write lock across the
/// limit re-check, the ledger append and the counter increment, so the
/// invariant `usage_count == sum(used_by.usage_count)` holds by
/// construction and the last remaining use has exactly one winner.
pub struct MemCouponRepository {
    coupons: RwLock<HashMap<String, Coupon>>,
}

impl MemCouponRepository {
    pub fn new() -> Self {
        Self {
            coupons: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemCouponRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CouponRepository for MemCouponRepository {
    async fn find(
        &self,
        code: &str,
    ) -> Result<Option<Coupon>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.coupons.read().await.get(code).cloned())
    }

    async fn insert(
        &self,
        coupon: Coupon,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.coupons
            .write()
            .await
            .insert(coupon.code.clone(), coupon);
        Ok(())
    }

    async fn redeem_if_available(
        &self,
        code: &str,
        user_id: Uuid,
        order_id: Uuid,
        cart_total_cents: i64,
        now: DateTime<Utc>,
    ) -> Result<RedeemOutcome, Box<dyn std::error::Error + Send + Sync>> {
        let mut coupons = self.coupons.write().await;
        let coupon = match coupons.get_mut(code) {
            Some(coupon) => coupon,
            None => return Ok(RedeemOutcome::Rejected(RejectionReason::NotFound)),
        };

        if let Err(reason) = coupon.check_redeemable(now, Some(user_id)) {
            return Ok(RedeemOutcome::Rejected(reason));
        }
        if cart_total_cents < coupon.min_purchase_cents {
            return Ok(RedeemOutcome::Rejected(RejectionReason::MinPurchaseNotMet));
        }

        coupon.usage_count += 1;
        coupon.used_by.push(UsageRecord {
            user_id,
            order_id,
            used_at: now,
            usage_count: 1,
        });
        Ok(RedeemOutcome::Redeemed)
    }
}
