use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use studia_catalog::ItemKind;
use studia_core::RejectionReason;
use uuid::Uuid;

/// How the discount amount is derived from the cart total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// Percentage of the cart total, optionally capped.
    Percentage {
        percent: u32,
        max_discount_cents: Option<i64>,
    },
    /// Flat amount, never more than the cart total.
    Fixed { amount_cents: i64 },
}

impl DiscountType {
    /// Compute the discount for a given cart total. The result always
    /// satisfies `0 <= discount <= cart_total`.
    pub fn discount_for(&self, cart_total_cents: i64) -> i64 {
        let raw = match self {
            DiscountType::Percentage {
                percent,
                max_discount_cents,
            } => {
                let pct = cart_total_cents * i64::from(*percent) / 100;
                match max_discount_cents {
                    Some(cap) => pct.min(*cap),
                    None => pct,
                }
            }
            DiscountType::Fixed { amount_cents } => *amount_cents,
        };
        raw.clamp(0, cart_total_cents)
    }
}

/// Which cart item kinds a coupon may discount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicabilityScope {
    All,
    Courses,
    Ebooks,
    DemoClasses,
    /// Only the listed catalog item ids qualify.
    Specific(Vec<Uuid>),
}

impl ApplicabilityScope {
    pub fn matches(&self, kind: ItemKind, reference_id: Uuid) -> bool {
        match self {
            ApplicabilityScope::All => true,
            ApplicabilityScope::Courses => kind == ItemKind::Course,
            ApplicabilityScope::Ebooks => kind == ItemKind::Ebook,
            ApplicabilityScope::DemoClasses => kind == ItemKind::DemoClass,
            ApplicabilityScope::Specific(ids) => ids.contains(&reference_id),
        }
    }
}

/// One redemption in the append-only usage ledger. The ledger is the
/// source of truth for per-user usage; the aggregate `usage_count` must
/// always equal the sum of these entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub user_id: Uuid,
    pub order_id: Uuid,
    pub used_at: DateTime<Utc>,
    pub usage_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    /// Unique, stored normalized (trimmed, uppercase).
    pub code: String,
    pub discount: DiscountType,
    pub min_purchase_cents: i64,
    pub scope: ApplicabilityScope,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    /// None = unlimited global uses.
    pub usage_limit: Option<u32>,
    pub usage_count: u32,
    /// Maximum redemptions per user.
    pub user_limit: u32,
    pub is_active: bool,
    pub used_by: Vec<UsageRecord>,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    pub fn new(code: &str, discount: DiscountType) -> Self {
        Self {
            code: Self::normalize_code(code),
            discount,
            min_purchase_cents: 0,
            scope: ApplicabilityScope::All,
            starts_at: None,
            ends_at: None,
            usage_limit: None,
            usage_count: 0,
            user_limit: 1,
            is_active: true,
            used_by: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Checks 2-5 of the validation pipeline, shared between validate and
    /// the redeem-time re-check. Check order is part of the contract: the
    /// first failing check names the rejection.
    pub fn check_redeemable(
        &self,
        now: DateTime<Utc>,
        user_id: Option<Uuid>,
    ) -> Result<(), RejectionReason> {
        if !self.is_active {
            return Err(RejectionReason::Inactive);
        }
        if let Some(starts_at) = self.starts_at {
            if now < starts_at {
                return Err(RejectionReason::NotStarted);
            }
        }
        if let Some(ends_at) = self.ends_at {
            if now > ends_at {
                return Err(RejectionReason::Expired);
            }
        }
        if let Some(limit) = self.usage_limit {
            if self.usage_count >= limit {
                return Err(RejectionReason::UsageLimitExceeded);
            }
        }
        if let Some(user_id) = user_id {
            if self.user_usage(user_id) >= self.user_limit {
                return Err(RejectionReason::UserLimitExceeded);
            }
        }
        Ok(())
    }

    /// Total uses by one user, summed over the ledger.
    pub fn user_usage(&self, user_id: Uuid) -> u32 {
        self.used_by
            .iter()
            .filter(|record| record.user_id == user_id)
            .map(|record| record.usage_count)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn code_is_normalized() {
        assert_eq!(Coupon::normalize_code("  save20 "), "SAVE20");
    }

    #[test]
    fn percentage_discount_is_capped() {
        let discount = DiscountType::Percentage {
            percent: 20,
            max_discount_cents: Some(50_000),
        };
        // 20% of 100000 = 20000, under the cap
        assert_eq!(discount.discount_for(100_000), 20_000);
        // 20% of 500000 = 100000, capped at 50000
        assert_eq!(discount.discount_for(500_000), 50_000);
    }

    #[test]
    fn fixed_discount_never_exceeds_cart_total() {
        let discount = DiscountType::Fixed { amount_cents: 50_000 };
        assert_eq!(discount.discount_for(150_000), 50_000);
        assert_eq!(discount.discount_for(30_000), 30_000);
        assert_eq!(discount.discount_for(0), 0);
    }

    #[test]
    fn check_order_is_stable() {
        let now = Utc::now();
        let mut coupon = Coupon::new("STACK", DiscountType::Fixed { amount_cents: 100 });
        coupon.is_active = false;
        coupon.ends_at = Some(now - Duration::days(1));
        coupon.usage_limit = Some(0);

        // Inactive wins over expired and exhausted
        assert_eq!(
            coupon.check_redeemable(now, None),
            Err(RejectionReason::Inactive)
        );
        coupon.is_active = true;
        assert_eq!(
            coupon.check_redeemable(now, None),
            Err(RejectionReason::Expired)
        );
        coupon.ends_at = None;
        assert_eq!(
            coupon.check_redeemable(now, None),
            Err(RejectionReason::UsageLimitExceeded)
        );
    }

    #[test]
    fn user_usage_sums_ledger_entries() {
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut coupon = Coupon::new("TWICE", DiscountType::Fixed { amount_cents: 100 });
        coupon.user_limit = 2;
        for _ in 0..2 {
            coupon.used_by.push(UsageRecord {
                user_id: user,
                order_id: Uuid::new_v4(),
                used_at: Utc::now(),
                usage_count: 1,
            });
        }
        assert_eq!(coupon.user_usage(user), 2);
        assert_eq!(coupon.user_usage(other), 0);
        assert_eq!(
            coupon.check_redeemable(Utc::now(), Some(user)),
            Err(RejectionReason::UserLimitExceeded)
        );
        assert_eq!(coupon.check_redeemable(Utc::now(), Some(other)), Ok(()));
    }
}
