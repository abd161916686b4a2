//! Scan-and-substitute over multi-status bodies.
//!
//! The upstream document is treated as opaque text, not XML: only the exact
//! `<d:getlastmodified>` element is touched, everything else stays
//! byte-identical. A real parse/serialize round trip could reorder
//! attributes or re-encode entities the client depends on.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::rewrite::timestamp;

/// Matches the timestamp element. `[^<]*` keeps the capture inside a single
/// element; nested or unbalanced markup in there is out of contract.
static LAST_MODIFIED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<d:getlastmodified>([^<]*)</d:getlastmodified>").unwrap());

/// Rewrite every `<d:getlastmodified>` occurrence to RFC1123 GMT.
///
/// Total over arbitrary input: empty or whitespace-only content passes
/// through untouched, and a value that fails to normalize keeps its original
/// text with a logged warning instead of corrupting the document.
pub fn rewrite_document(body: &str) -> Cow<'_, str> {
    LAST_MODIFIED.replace_all(body, |caps: &Captures| {
        let content = caps[1].trim();
        if content.is_empty() {
            return caps[0].to_string();
        }
        match timestamp::normalize(content) {
            Some(normalized) => {
                format!("<d:getlastmodified>{normalized}</d:getlastmodified>")
            }
            None => {
                tracing::warn!(value = %content, "unparseable getlastmodified left as-is");
                caps[0].to_string()
            }
        }
    })
}
