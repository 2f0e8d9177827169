//! Checkout submission and order history.

use std::sync::Arc;

use axum::{Extension, Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

use storefront_core::{AddressId, ProductId};
use storefront_orders::OrderItem;

use crate::app::dto::{CheckoutResponse, OrderCreateRequest};
use crate::app::errors::domain_error_to_response;
use crate::app::services::AppServices;
use crate::context::CallerContext;

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<OrderCreateRequest>,
) -> axum::response::Response {
    let address_id = match body.address {
        Some(raw) => match raw.parse::<AddressId>() {
            Ok(id) => Some(id),
            Err(err) => return domain_error_to_response(err),
        },
        None => None,
    };

    let mut items = Vec::with_capacity(body.items.len());
    for item in body.items {
        let product = match ProductId::new(item.product) {
            Ok(id) => id,
            Err(err) => return domain_error_to_response(err),
        };
        items.push(OrderItem {
            product,
            quantity: item.quantity,
        });
    }

    match services
        .checkout
        .checkout(caller.user_id().clone(), address_id, items)
    {
        Ok(receipt) => (
            StatusCode::OK,
            Json(CheckoutResponse {
                success: true,
                message: receipt.message,
                amount: receipt.amount,
            }),
        )
            .into_response(),
        Err(err) => domain_error_to_response(err),
    }
}

/// Order history, expanded with address and product details,
/// most recent first.
pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    match services.gateway.orders_for_user(caller.user_id()) {
        Ok(mut orders) => {
            orders.reverse();
            (
                StatusCode::OK,
                Json(json!({ "success": true, "orders": orders })),
            )
                .into_response()
        }
        Err(err) => domain_error_to_response(err),
    }
}
