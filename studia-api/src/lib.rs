use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod auth;
pub mod coupons;
pub mod error;
pub mod orders;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    Router::new()
        .route("/v1/coupons/validate", post(coupons::validate_coupon))
        .route("/v1/orders", post(orders::create_order).get(orders::list_orders))
        .route("/v1/orders/{id}", get(orders::get_order))
        .route("/v1/orders/{id}/verify-payment", post(orders::verify_payment))
        .route("/v1/orders/{id}/checkout", post(orders::checkout))
        .route(
            "/v1/admin/orders/{id}/confirm-payment",
            post(admin::confirm_payment),
        )
        .route("/v1/admin/orders/{id}/refund", post(admin::refund_order))
        .route("/v1/admin/coupons", post(admin::create_coupon))
        .route("/v1/admin/catalog-items", post(admin::create_catalog_item))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
