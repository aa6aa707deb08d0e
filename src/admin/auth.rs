use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::http::server::AppState;

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .is_some_and(|token| token_matches(token, &state.config.admin.api_key));

    if authorized {
        return Ok(next.run(request).await);
    }

    tracing::warn!(path = %request.uri().path(), "Rejected admin request");
    Err(StatusCode::UNAUTHORIZED)
}

/// Constant-time comparison; `ct_eq` needs slices of equal length.
fn token_matches(token: &str, api_key: &str) -> bool {
    let (token, api_key) = (token.as_bytes(), api_key.as_bytes());
    token.len() == api_key.len() && token.ct_eq(api_key).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_matches() {
        assert!(token_matches("test-admin-key", "test-admin-key"));
        assert!(!token_matches("test-admin-kez", "test-admin-key"));
        assert!(!token_matches("test-admin", "test-admin-key"));
        assert!(!token_matches("test-admin-key-longer", "test-admin-key"));
        assert!(!token_matches("", "test-admin-key"));
    }
}
