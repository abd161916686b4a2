//! Timestamp normalization for WebDAV `getlastmodified` values.
//!
//! The indexer emits RFC3339/ISO-8601 timestamps (with offsets or a trailing
//! `Z`, sometimes with milliseconds); WebDAV clients require RFC1123 GMT.

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// RFC1123 output format. Chrono's `to_rfc2822` renders the zone as `+0000`
/// rather than the `GMT` the client ecosystem expects, so the format string
/// is spelled out.
const RFC1123_GMT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// A fractional-seconds component immediately before a trailing `Z`.
static MILLIS_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\d{3}Z$").unwrap());

/// Ordered parse candidates, first success wins.
///
/// RFC3339 covers the indexer's usual output, RFC2822 covers values that are
/// already in wire form, and the bare GMT pattern catches RFC1123 text that
/// RFC2822 parsing rejects for folding/whitespace reasons.
fn parse_any(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            DateTime::parse_from_rfc2822(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, RFC1123_GMT)
                .ok()
                .map(|ndt| DateTime::from_naive_utc_and_offset(ndt, Utc))
        })
}

/// Convert a trimmed, non-empty timestamp in an unknown format to RFC1123 GMT.
///
/// Any offset in the input shifts the instant to UTC before formatting; the
/// host timezone is never consulted. Returns `None` when no candidate parses,
/// and the caller is expected to keep the original text rather than emit an
/// invalid value.
pub fn normalize(raw: &str) -> Option<String> {
    parse_any(raw)
        .or_else(|| parse_any(&MILLIS_SUFFIX.replace(raw, "Z")))
        .map(|utc| utc.format(RFC1123_GMT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_is_converted_to_utc() {
        assert_eq!(
            normalize("2025-07-02T19:32:30.000+01:00").as_deref(),
            Some("Wed, 02 Jul 2025 18:32:30 GMT")
        );
    }

    #[test]
    fn test_utc_with_milliseconds() {
        assert_eq!(
            normalize("2025-07-02T19:32:30.000Z").as_deref(),
            Some("Wed, 02 Jul 2025 19:32:30 GMT")
        );
    }

    #[test]
    fn test_utc_without_milliseconds() {
        assert_eq!(
            normalize("2025-07-02T19:32:30Z").as_deref(),
            Some("Wed, 02 Jul 2025 19:32:30 GMT")
        );
    }

    #[test]
    fn test_already_rfc1123_round_trips() {
        assert_eq!(
            normalize("Wed, 02 Jul 2025 17:32:30 GMT").as_deref(),
            Some("Wed, 02 Jul 2025 17:32:30 GMT")
        );
    }

    #[test]
    fn test_garbage_fails() {
        assert_eq!(normalize("not-a-date"), None);
    }

    #[test]
    fn test_negative_offset() {
        assert_eq!(
            normalize("2025-12-31T23:30:00-05:00").as_deref(),
            Some("Thu, 01 Jan 2026 04:30:00 GMT")
        );
    }

    #[test]
    fn test_date_only_input_fails_cleanly() {
        // The stripping regex only fires on `.NNNZ` suffixes; other inputs
        // reach the second attempt unchanged and still fail without panics.
        assert_eq!(normalize("2025-07-02"), None);
    }
}
