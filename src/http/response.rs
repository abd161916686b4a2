//! Response handling toward the client.
//!
//! Upstream headers pass through untouched with two exceptions: hop-by-hop
//! headers never cross a proxy, and `Content-Length` must describe the body
//! actually sent, which changes when a multi-status document is rewritten.

use axum::body::Body;
use axum::http::{header, response::Parts, HeaderMap, HeaderValue, Response};

/// Connection-scoped headers (RFC 9110 §7.6.1).
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove headers that describe the upstream connection, not the resource.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Wrap a rewritten body in the upstream's status and headers.
///
/// The rewriter never touches headers itself; only `Content-Length` is
/// recomputed here because the substitution may have changed the body size.
pub fn with_rewritten_body(mut parts: Parts, body: String) -> Response<Body> {
    strip_hop_by_hop(&mut parts.headers);
    parts
        .headers
        .insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
    Response::from_parts(parts, Body::from(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_hop_by_hop_headers_are_stripped() {
        let mut headers = HeaderMap::new();
        headers.insert("connection", HeaderValue::from_static("keep-alive"));
        headers.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        headers.insert("content-type", HeaderValue::from_static("text/xml"));

        strip_hop_by_hop(&mut headers);

        assert!(headers.get("connection").is_none());
        assert!(headers.get("transfer-encoding").is_none());
        assert_eq!(headers["content-type"], "text/xml");
    }

    #[test]
    fn test_rewritten_body_updates_content_length() {
        let upstream = Response::builder()
            .status(StatusCode::MULTI_STATUS)
            .header("content-type", "application/xml")
            .header("content-length", "3")
            .body(())
            .unwrap();
        let (parts, ()) = upstream.into_parts();

        let response = with_rewritten_body(parts, "rewritten body".to_string());

        assert_eq!(response.status(), StatusCode::MULTI_STATUS);
        assert_eq!(response.headers()["content-type"], "application/xml");
        assert_eq!(response.headers()["content-length"], "14");
    }
}
