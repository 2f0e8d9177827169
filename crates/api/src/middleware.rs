use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use storefront_core::UserId;

use crate::context::CallerContext;

/// Require a pre-verified caller identity in the `x-user-id` header and make
/// it available to handlers as a [`CallerContext`] extension.
pub async fn caller_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let user_id = extract_caller(req.headers())?;
    req.extensions_mut().insert(CallerContext::new(user_id));
    Ok(next.run(req).await)
}

fn extract_caller(headers: &HeaderMap) -> Result<UserId, StatusCode> {
    let header = headers.get("x-user-id").ok_or(StatusCode::UNAUTHORIZED)?;
    let value = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;
    UserId::new(value.trim()).map_err(|_| StatusCode::UNAUTHORIZED)
}
