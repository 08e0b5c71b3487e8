use std::sync::Arc;

use studia_catalog::InMemoryCatalog;
use studia_core::PaymentAdapter;
use studia_coupon::{CouponEngine, CouponRepository};
use studia_enrollment::EnrollmentRepository;
use studia_order::OrderLedger;
use studia_store::app_config::{AuthConfig, BusinessRules};

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<OrderLedger>,
    pub coupons: Arc<CouponEngine>,
    pub coupon_repo: Arc<dyn CouponRepository>,
    pub enrollment_repo: Arc<dyn EnrollmentRepository>,
    pub catalog: Arc<InMemoryCatalog>,
    pub gateway: Arc<dyn PaymentAdapter>,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}
