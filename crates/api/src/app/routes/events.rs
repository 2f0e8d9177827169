//! Inbound event webhook.

use std::sync::Arc;

use axum::{Extension, Json, http::StatusCode, response::IntoResponse};

use storefront_events::EventBus;
use storefront_pipeline::dispatch::InboundEvent;

use crate::app::dto::SuccessResponse;
use crate::app::errors::{domain_error_to_response, json_error};
use crate::app::services::AppServices;

/// Accept a webhook delivery and hand it to the pipeline via the bus.
///
/// Decoding is strict: an unroutable kind is a 400, not a silent drop. A
/// 200 response only means the event was accepted for processing.
pub async fn ingest(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let event = match InboundEvent::decode(&body) {
        Ok(event) => event,
        Err(err) => return domain_error_to_response(err),
    };

    let kind = event.kind();
    if services.bus.publish(event).is_err() {
        return json_error(
            StatusCode::BAD_GATEWAY,
            "publish_error",
            "event bus unavailable",
        );
    }

    tracing::debug!(kind, "event accepted");
    (StatusCode::OK, Json(SuccessResponse::ok())).into_response()
}
