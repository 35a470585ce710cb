//! Authentication middleware for API key validation.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use paysaga_types::{PaymentGateway, StateStore};

use super::handlers::AppState;
use crate::security::verify_api_key;

/// Paths served without an API key. The webhook route authenticates with
/// its signature instead.
const PUBLIC_PATHS: &[&str] = &["/health", "/api/payments/webhook"];
const PUBLIC_PREFIXES: &[&str] = &["/docs", "/api-docs"];

/// Extracts the API key from the Authorization header.
/// Expected format: "Bearer <api_key>" or just "<api_key>"
fn extract_api_key(auth_header: Option<&str>) -> Option<&str> {
    let header = auth_header?;
    Some(header.strip_prefix("Bearer ").unwrap_or(header).trim())
}

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path) || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Authentication middleware that validates the API key.
///
/// The presented key is hashed with SHA-256 and compared in constant time
/// against the configured key hash. Returns 401 Unauthorized on mismatch.
pub async fn auth_middleware<G: PaymentGateway, S: StateStore>(
    State(state): State<Arc<AppState<G, S>>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if is_public(request.uri().path()) {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let api_key = match extract_api_key(auth_header) {
        Some(key) if !key.is_empty() => key,
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    if !verify_api_key(api_key, &state.api_key_hash) {
        tracing::warn!(path = %request.uri().path(), "Rejected request with invalid API key");
        return unauthorized_response("Invalid API key");
    }

    next.run(request).await
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": message,
            "code": 401
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_api_key_bearer() {
        assert_eq!(
            extract_api_key(Some("Bearer sk_test_123")),
            Some("sk_test_123")
        );
    }

    #[test]
    fn test_extract_api_key_raw() {
        assert_eq!(extract_api_key(Some("sk_test_123")), Some("sk_test_123"));
    }

    #[test]
    fn test_extract_api_key_none() {
        assert_eq!(extract_api_key(None), None);
    }

    #[test]
    fn test_public_paths() {
        assert!(is_public("/health"));
        assert!(is_public("/api/payments/webhook"));
        assert!(is_public("/docs/index.html"));
        assert!(is_public("/api-docs/openapi.json"));
        assert!(!is_public("/api/payments/create"));
    }
}
