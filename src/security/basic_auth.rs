//! Optional proxy-level Basic auth.
//!
//! WebDAV clients authenticate with Basic out of the box, so the gate speaks
//! the same scheme: compare the decoded `user:pass` against the configured
//! pair, challenge with the configured realm otherwise.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::config::AuthConfig;

/// Middleware enforcing Basic auth. Installed only when both credentials are
/// configured; without them every request passes.
pub async fn require_basic_auth(
    State(auth): State<AuthConfig>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some((username, password)) = auth.credentials() else {
        return next.run(request).await;
    };

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|value| credentials_match(value, username, password));

    if authorized {
        next.run(request).await
    } else {
        challenge(&auth.realm)
    }
}

/// Check an `Authorization` header value against the expected credentials.
/// Any malformed header (wrong scheme, bad base64, no colon) is a mismatch,
/// never an error.
fn credentials_match(header_value: &str, username: &str, password: &str) -> bool {
    let Some(encoded) = header_value.strip_prefix("Basic ") else {
        return false;
    };
    let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
        return false;
    };
    let Ok(decoded) = String::from_utf8(decoded) else {
        return false;
    };
    match decoded.split_once(':') {
        Some((user, pass)) => user == username && pass == password,
        None => false,
    }
}

fn challenge(realm: &str) -> Response {
    let mut response = (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    if let Ok(value) = HeaderValue::from_str(&format!("Basic realm=\"{realm}\"")) {
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, value);
    }
    response
}
