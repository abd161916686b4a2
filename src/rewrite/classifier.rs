//! Decides which upstream responses go through the rewriter.

use axum::http::{Method, StatusCode};

/// True when a response body should be rewritten: a PROPFIND multi-status
/// reply declaring an XML body. The content-type check is a plain substring
/// match ("application/xml", "text/xml; charset=utf-8", ...), not a MIME
/// parse, and is case-sensitive like the rest of the predicate.
pub fn should_rewrite(method: &Method, content_type: Option<&str>, status: StatusCode) -> bool {
    method.as_str() == "PROPFIND"
        && content_type.is_some_and(|ct| ct.contains("xml"))
        && status == StatusCode::MULTI_STATUS
}
