use serde::{Deserialize, Serialize};

/// Why a coupon could not be applied or redeemed. Validation failures are
/// recovered at the call site and returned as structured rejections, never
/// as aborts of unrelated work.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    #[error("Coupon not found")]
    NotFound,

    #[error("Coupon is inactive")]
    Inactive,

    #[error("Coupon has expired")]
    Expired,

    #[error("Coupon is not yet valid")]
    NotStarted,

    #[error("Coupon usage limit exceeded")]
    UsageLimitExceeded,

    #[error("Per-user usage limit exceeded")]
    UserLimitExceeded,

    #[error("Cart total below minimum purchase amount")]
    MinPurchaseNotMet,

    #[error("Coupon does not apply to any cart item")]
    NotApplicable,
}
