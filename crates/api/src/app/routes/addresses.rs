//! Address submission and listing.

use std::sync::Arc;

use axum::{Extension, Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

use storefront_core::AddressId;
use storefront_pipeline::address::Address;
use storefront_pipeline::store::AddressStore;

use crate::app::dto::AddAddressRequest;
use crate::app::errors::domain_error_to_response;
use crate::app::services::AppServices;
use crate::context::CallerContext;

pub async fn add_address(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<AddAddressRequest>,
) -> axum::response::Response {
    let address = Address {
        id: AddressId::new(),
        user_id: caller.user_id().clone(),
        full_name: body.full_name,
        phone_number: body.phone_number,
        pincode: body.pincode,
        area: body.area,
        city: body.city,
        state: body.state,
    };

    match services.addresses.add(address.clone()) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "address": address })),
        )
            .into_response(),
        Err(err) => domain_error_to_response(err.into()),
    }
}

pub async fn list_addresses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    match services.addresses.for_user(caller.user_id()) {
        Ok(addresses) => (
            StatusCode::OK,
            Json(json!({ "success": true, "addresses": addresses })),
        )
            .into_response(),
        Err(err) => domain_error_to_response(err.into()),
    }
}
