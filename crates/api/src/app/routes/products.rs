//! Catalog listing.

use std::sync::Arc;

use axum::{Extension, Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

use storefront_catalog::ProductCatalog;

use crate::app::services::AppServices;

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let products = services.catalog.list();
    (
        StatusCode::OK,
        Json(json!({ "success": true, "products": products })),
    )
        .into_response()
}
