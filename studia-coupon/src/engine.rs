use std::sync::Arc;

use serde::{Deserialize, Serialize};
use studia_catalog::PricedLine;
use studia_core::{Clock, RejectionReason};
use uuid::Uuid;

use crate::models::Coupon;
use crate::repository::CouponRepository;

#[derive(Debug, thiserror::Error)]
pub enum CouponError {
    /// The coupon did not pass validation. Carries the computed cart total
    /// so clients can display why the code did not apply.
    #[error("{reason}")]
    Rejected {
        reason: RejectionReason,
        cart_total_cents: i64,
    },

    #[error("Coupon storage failure: {0}")]
    Storage(String),
}

/// Result of a successful validation: the amounts a client would see at
/// checkout. Tax is applied later by the order, on the undiscounted
/// subtotal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponQuote {
    pub code: String,
    pub cart_total_cents: i64,
    pub discount_cents: i64,
    pub final_total_cents: i64,
}

/// Outcome of a redemption attempt. Rejections here are expected under
/// contention and at the validate/redeem time gap; callers decide how to
/// re-price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemOutcome {
    Redeemed,
    Rejected(RejectionReason),
}

/// Validates coupon codes against a cart and performs redemption once an
/// order is confirmed. Validation is read-only and safe to repeat;
/// redemption is a single conditional write owned by the repository.
pub struct CouponEngine {
    repo: Arc<dyn CouponRepository>,
    clock: Arc<dyn Clock>,
}

impl CouponEngine {
    pub fn new(repo: Arc<dyn CouponRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Run the full validation pipeline against a priced cart. Checks fire
    /// in a fixed order and the first failure names the rejection. No
    /// counter is touched here.
    pub async fn validate(
        &self,
        code: &str,
        cart: &[PricedLine],
        user_id: Option<Uuid>,
    ) -> Result<CouponQuote, CouponError> {
        let cart_total_cents: i64 = cart.iter().map(PricedLine::line_total_cents).sum();
        let reject = |reason| CouponError::Rejected {
            reason,
            cart_total_cents,
        };

        let normalized = Coupon::normalize_code(code);
        let coupon = self
            .repo
            .find(&normalized)
            .await
            .map_err(|e| CouponError::Storage(e.to_string()))?
            .ok_or_else(|| reject(RejectionReason::NotFound))?;

        coupon
            .check_redeemable(self.clock.now(), user_id)
            .map_err(reject)?;

        if cart_total_cents < coupon.min_purchase_cents {
            return Err(reject(RejectionReason::MinPurchaseNotMet));
        }

        let applies = cart
            .iter()
            .any(|line| coupon.scope.matches(line.kind, line.reference_id));
        if !applies {
            return Err(reject(RejectionReason::NotApplicable));
        }

        let discount_cents = coupon.discount.discount_for(cart_total_cents);
        Ok(CouponQuote {
            code: coupon.code,
            cart_total_cents,
            discount_cents,
            final_total_cents: cart_total_cents - discount_cents,
        })
    }

    /// Record one use of the coupon for a confirmed order. The coupon may
    /// have expired, been exhausted or had its minimum purchase raised
    /// since validation, so limits and the minimum are re-checked against
    /// the order's frozen cart total inside the repository's atomic redeem.
    pub async fn redeem(
        &self,
        code: &str,
        user_id: Uuid,
        order_id: Uuid,
        cart_total_cents: i64,
    ) -> Result<RedeemOutcome, CouponError> {
        let normalized = Coupon::normalize_code(code);
        let outcome = self
            .repo
            .redeem_if_available(&normalized, user_id, order_id, cart_total_cents, self.clock.now())
            .await
            .map_err(|e| CouponError::Storage(e.to_string()))?;

        match &outcome {
            RedeemOutcome::Redeemed => {
                tracing::info!(code = %normalized, %user_id, %order_id, "coupon redeemed");
            }
            RedeemOutcome::Rejected(reason) => {
                tracing::warn!(code = %normalized, %user_id, %order_id, %reason, "coupon redemption rejected");
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApplicabilityScope, DiscountType, UsageRecord};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use studia_catalog::ItemKind;
    use studia_core::{FixedClock, SystemClock};

    /// Minimal in-memory repo for engine tests. The production store has
    /// its own implementation with the same contract.
    #[derive(Default)]
    struct StubRepo {
        coupons: Mutex<HashMap<String, Coupon>>,
    }

    #[async_trait]
    impl CouponRepository for StubRepo {
        async fn find(
            &self,
            code: &str,
        ) -> Result<Option<Coupon>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.coupons.lock().unwrap().get(code).cloned())
        }

        async fn insert(
            &self,
            coupon: Coupon,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.coupons
                .lock()
                .unwrap()
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
            let mut coupons = self.coupons.lock().unwrap();
            let coupon = match coupons.get_mut(code) {
                Some(c) => c,
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

    fn course_line(price_cents: i64) -> PricedLine {
        PricedLine {
            kind: ItemKind::Course,
            reference_id: Uuid::new_v4(),
            title: "Course".to_string(),
            unit_price_cents: price_cents,
            quantity: 1,
        }
    }

    async fn engine_with(coupon: Coupon) -> CouponEngine {
        let repo = Arc::new(StubRepo::default());
        repo.insert(coupon).await.unwrap();
        CouponEngine::new(repo, Arc::new(SystemClock))
    }

    #[tokio::test]
    async fn save20_scenario() {
        // Percentage 20, min purchase 500, max discount 500, cart 1000
        let mut coupon = Coupon::new(
            "SAVE20",
            DiscountType::Percentage {
                percent: 20,
                max_discount_cents: Some(500),
            },
        );
        coupon.min_purchase_cents = 500;
        let engine = engine_with(coupon).await;

        let quote = engine
            .validate("save20", &[course_line(1000)], None)
            .await
            .unwrap();
        assert_eq!(quote.discount_cents, 200);
        assert_eq!(quote.final_total_cents, 800);
    }

    #[tokio::test]
    async fn flat500_below_min_purchase() {
        let mut coupon = Coupon::new("FLAT500", DiscountType::Fixed { amount_cents: 500 });
        coupon.min_purchase_cents = 2000;
        let engine = engine_with(coupon).await;

        let err = engine
            .validate("FLAT500", &[course_line(1500)], None)
            .await
            .unwrap_err();
        match err {
            CouponError::Rejected {
                reason,
                cart_total_cents,
            } => {
                assert_eq!(reason, RejectionReason::MinPurchaseNotMet);
                assert_eq!(cart_total_cents, 1500);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let engine = CouponEngine::new(Arc::new(StubRepo::default()), Arc::new(SystemClock));
        let err = engine
            .validate("NOPE", &[course_line(1000)], None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CouponError::Rejected {
                reason: RejectionReason::NotFound,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn window_checks_use_injected_clock() {
        let now = Utc::now();
        let mut coupon = Coupon::new("WINDOW", DiscountType::Fixed { amount_cents: 100 });
        coupon.starts_at = Some(now + Duration::days(1));
        coupon.ends_at = Some(now + Duration::days(2));
        let repo = Arc::new(StubRepo::default());
        repo.insert(coupon).await.unwrap();

        // Before the window
        let engine = CouponEngine::new(repo.clone(), Arc::new(FixedClock(now)));
        let err = engine
            .validate("WINDOW", &[course_line(1000)], None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CouponError::Rejected {
                reason: RejectionReason::NotStarted,
                ..
            }
        ));

        // Inside the window
        let engine = CouponEngine::new(
            repo.clone(),
            Arc::new(FixedClock(now + Duration::days(1) + Duration::hours(1))),
        );
        assert!(engine
            .validate("WINDOW", &[course_line(1000)], None)
            .await
            .is_ok());

        // After the window
        let engine = CouponEngine::new(repo, Arc::new(FixedClock(now + Duration::days(3))));
        let err = engine
            .validate("WINDOW", &[course_line(1000)], None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CouponError::Rejected {
                reason: RejectionReason::Expired,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn scope_must_match_at_least_one_item() {
        let mut coupon = Coupon::new("EBOOKS", DiscountType::Fixed { amount_cents: 100 });
        coupon.scope = ApplicabilityScope::Ebooks;
        let engine = engine_with(coupon).await;

        let err = engine
            .validate("EBOOKS", &[course_line(1000)], None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CouponError::Rejected {
                reason: RejectionReason::NotApplicable,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn specific_scope_matches_listed_item() {
        let line = course_line(1000);
        let mut coupon = Coupon::new("ONLYA", DiscountType::Fixed { amount_cents: 100 });
        coupon.scope = ApplicabilityScope::Specific(vec![line.reference_id]);
        let engine = engine_with(coupon).await;

        assert!(engine.validate("ONLYA", &[line], None).await.is_ok());
        assert!(engine
            .validate("ONLYA", &[course_line(1000)], None)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn validate_is_side_effect_free() {
        let mut coupon = Coupon::new("READ", DiscountType::Fixed { amount_cents: 100 });
        coupon.usage_limit = Some(1);
        let repo = Arc::new(StubRepo::default());
        repo.insert(coupon).await.unwrap();
        let engine = CouponEngine::new(repo.clone(), Arc::new(SystemClock));

        for _ in 0..5 {
            engine
                .validate("READ", &[course_line(1000)], None)
                .await
                .unwrap();
        }
        let stored = repo.find("READ").await.unwrap().unwrap();
        assert_eq!(stored.usage_count, 0);
        assert!(stored.used_by.is_empty());
    }

    #[tokio::test]
    async fn redeem_after_exhaustion_is_rejected() {
        let mut coupon = Coupon::new("ONCE", DiscountType::Fixed { amount_cents: 100 });
        coupon.usage_limit = Some(1);
        coupon.user_limit = 5;
        let repo = Arc::new(StubRepo::default());
        repo.insert(coupon).await.unwrap();
        let engine = CouponEngine::new(repo, Arc::new(SystemClock));

        let user = Uuid::new_v4();
        let first = engine
            .redeem("ONCE", user, Uuid::new_v4(), 1000)
            .await
            .unwrap();
        assert_eq!(first, RedeemOutcome::Redeemed);

        let second = engine
            .redeem("ONCE", user, Uuid::new_v4(), 1000)
            .await
            .unwrap();
        assert_eq!(
            second,
            RedeemOutcome::Rejected(RejectionReason::UsageLimitExceeded)
        );
    }

    #[tokio::test]
    async fn redeem_rechecks_min_purchase_against_cart_total() {
        let mut coupon = Coupon::new("FLAT100", DiscountType::Fixed { amount_cents: 100 });
        coupon.min_purchase_cents = 2000;
        let repo = Arc::new(StubRepo::default());
        repo.insert(coupon).await.unwrap();
        let engine = CouponEngine::new(repo.clone(), Arc::new(SystemClock));

        // The order was priced below the (since raised) minimum
        let outcome = engine
            .redeem("FLAT100", Uuid::new_v4(), Uuid::new_v4(), 1500)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            RedeemOutcome::Rejected(RejectionReason::MinPurchaseNotMet)
        );

        // No use was consumed by the rejected attempt
        let stored = repo.find("FLAT100").await.unwrap().unwrap();
        assert_eq!(stored.usage_count, 0);
        assert!(stored.used_by.is_empty());
    }
}
