//! Optional API key check for every route except `/health`.
//!
//! Enabled by `ROSTER_API_KEY`. Clients send `Authorization: Bearer <key>`;
//! a bare `<key>` header value is accepted as well.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// `ROSTER_API_KEY`, if set to a non-empty value.
pub fn get_api_key_from_env() -> Option<String> {
    std::env::var("ROSTER_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
}

/// Constant-time key comparison over equal-length padded buffers.
fn keys_match(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();

    let width = provided.len().max(expected.len());
    let mut lhs = vec![0u8; width];
    let mut rhs = vec![0u8; width];
    lhs[..provided.len()].copy_from_slice(provided);
    rhs[..expected.len()].copy_from_slice(expected);

    let same_bytes: bool = lhs.ct_eq(&rhs).into();
    same_bytes && provided.len() == expected.len()
}

/// Key presented by the client, with any `Bearer ` prefix removed.
fn presented_key(request: &Request<Body>) -> Option<&str> {
    let value = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    Some(value.strip_prefix("Bearer ").unwrap_or(value))
}

fn unauthorized(reason: &'static str) -> (StatusCode, &'static str) {
    tracing::warn!(event = "auth_failure", reason, "request rejected");
    (StatusCode::UNAUTHORIZED, "Unauthorized")
}

/// Require the configured key on every route except `/health`.
pub async fn api_key_auth_middleware(
    State(expected): State<Arc<str>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let verdict = presented_key(&request).map(|key| keys_match(key, &expected));
    match verdict {
        Some(true) => Ok(next.run(request).await),
        Some(false) => Err(unauthorized("invalid_api_key")),
        None => Err(unauthorized("missing_authorization_header")),
    }
}

// =============================================================================
// TESTS
// =============================================================================
