//! Stored-cart endpoints: fetch and full-snapshot overwrite.

use std::sync::Arc;

use axum::{Extension, Json, http::StatusCode, response::IntoResponse};

use storefront_cart::CartSnapshot;
use storefront_core::{DomainError, ProductId};
use storefront_pipeline::store::UserStore;

use crate::app::dto::{CartResponse, CartUpdateRequest, SuccessResponse};
use crate::app::errors::domain_error_to_response;
use crate::app::services::AppServices;
use crate::context::CallerContext;

pub async fn get_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    match services.users.get(caller.user_id()) {
        Ok(Some(user)) => Json(CartResponse {
            success: true,
            cart: user.cart,
        })
        .into_response(),
        Ok(None) => domain_error_to_response(DomainError::NotFound),
        Err(err) => domain_error_to_response(err.into()),
    }
}

/// Overwrite the stored cart with the submitted snapshot. The payload is the
/// complete mapping, not a delta, so a re-sent update is harmless.
pub async fn update_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<CartUpdateRequest>,
) -> axum::response::Response {
    let mut entries = Vec::with_capacity(body.cart.len());
    for (product, quantity) in body.cart {
        let product = match ProductId::new(product) {
            Ok(id) => id,
            Err(err) => return domain_error_to_response(err),
        };
        entries.push((product, quantity));
    }

    let snapshot = match CartSnapshot::from_wire(entries) {
        Ok(snapshot) => snapshot,
        Err(err) => return domain_error_to_response(err),
    };

    match services.users.set_cart(caller.user_id(), snapshot) {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse::ok())).into_response(),
        Err(err) => domain_error_to_response(err.into()),
    }
}
