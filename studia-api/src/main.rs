use std::net::SocketAddr;
use std::sync::Arc;

use studia_api::{app, AppState};
use studia_catalog::InMemoryCatalog;
use studia_core::{SystemClock, TracingDispatcher};
use studia_coupon::CouponEngine;
use studia_enrollment::EnrollmentActivator;
use studia_order::{OrderLedger, PricingPolicy, SimulatedGateway};
use studia_store::{MemCouponRepository, MemEnrollmentRepository, MemOrderRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studia_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = studia_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Studia API on port {}", config.server.port);

    let catalog = Arc::new(InMemoryCatalog::new());
    let coupon_repo = Arc::new(MemCouponRepository::new());
    let order_repo = Arc::new(MemOrderRepository::new());
    let enrollment_repo = Arc::new(MemEnrollmentRepository::new());
    let clock = Arc::new(SystemClock);
    let notifier = Arc::new(TracingDispatcher);

    let coupons = Arc::new(CouponEngine::new(coupon_repo.clone(), clock.clone()));
    let activator = Arc::new(EnrollmentActivator::new(enrollment_repo.clone()));
    let ledger = Arc::new(OrderLedger::new(
        order_repo,
        catalog.clone(),
        coupons.clone(),
        activator,
        notifier,
        clock,
        PricingPolicy {
            tax_rate: config.business_rules.tax_rate,
            currency: config.business_rules.currency.clone(),
        },
    ));

    let state = AppState {
        ledger,
        coupons,
        coupon_repo,
        enrollment_repo,
        catalog,
        gateway: Arc::new(SimulatedGateway::new(
            config.business_rules.gateway_success_rate,
        )),
        auth: config.auth.clone(),
        business_rules: config.business_rules.clone(),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app(state)).await.unwrap();
}
