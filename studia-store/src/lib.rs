pub mod app_config;
pub mod coupon_repo;
pub mod enrollment_repo;
pub mod order_repo;

pub use coupon_repo::MemCouponRepository;
pub use enrollment_repo::MemEnrollmentRepository;
pub use order_repo::MemOrderRepository;
