use std::sync::Arc;

use axum::{
    Extension, Router,
    http::StatusCode,
    routing::{get, post},
};
use tower::ServiceBuilder;

use crate::app::services::AppServices;

pub mod addresses;
pub mod cart;
pub mod events;
pub mod orders;
pub mod products;

/// Build the production router with freshly wired services.
pub fn build_app() -> Router {
    router_with(AppServices::build())
}

/// Build the router around existing services (tests wire their own).
pub fn router_with(services: Arc<AppServices>) -> Router {
    // Caller-scoped routes need the verified identity from `x-user-id`.
    let caller_scoped = Router::new()
        .route("/api/cart", get(cart::get_cart))
        .route("/api/cart/update", post(cart::update_cart))
        .route("/api/order/create", post(orders::create_order))
        .route("/api/order/list", get(orders::list_orders))
        .route("/api/user/add-address", post(addresses::add_address))
        .route("/api/user/addresses", get(addresses::list_addresses))
        .layer(axum::middleware::from_fn(
            crate::middleware::caller_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/api/events", post(events::ingest))
        .route("/api/product/list", get(products::list))
        .merge(caller_scoped)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}

async fn health() -> StatusCode {
    StatusCode::OK
}
