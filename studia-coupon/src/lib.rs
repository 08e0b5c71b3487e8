pub mod engine;
pub mod models;
pub mod repository;

pub use engine::{CouponEngine, CouponError, CouponQuote, RedeemOutcome};
pub use models::{ApplicabilityScope, Coupon, DiscountType, UsageRecord};
pub use repository::CouponRepository;
