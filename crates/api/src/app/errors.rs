use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use storefront_core::DomainError;

/// Map a domain error onto the HTTP surface.
///
/// Validation-class failures are the caller's fault (400); missing resources
/// are 404; storage trouble is an upstream failure (502).
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::UnknownProduct(id) => json_error(
            StatusCode::BAD_REQUEST,
            "unknown_product",
            format!("unknown product: {id}"),
        ),
        DomainError::InvalidCartState(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_cart", msg)
        }
        DomainError::UnsupportedEventKind(kind) => json_error(
            StatusCode::BAD_REQUEST,
            "unsupported_event_kind",
            format!("unsupported event kind: {kind}"),
        ),
        DomainError::EmptyOrder(msg) => json_error(StatusCode::BAD_REQUEST, "empty_order", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::PersistenceFailure(msg) => {
            json_error(StatusCode::BAD_GATEWAY, "persistence_failure", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
