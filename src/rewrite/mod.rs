//! Multi-status timestamp rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! upstream response
//!     → classifier.rs (PROPFIND + xml content-type + 207?)
//!     → substitute.rs (find every <d:getlastmodified> element)
//!     → timestamp.rs (parse candidates in order, re-emit RFC1123 GMT)
//!     → body with matches replaced, everything else byte-identical
//! ```
//!
//! # Design Decisions
//! - Pure functions of their input; no I/O, no state, no locking
//! - Normalization failure degrades to "leave the original text as-is"
//! - Delimiter-based substitution instead of an XML round trip, so the
//!   document's formatting and entity encoding survive untouched

pub mod classifier;
pub mod substitute;
pub mod timestamp;

pub use classifier::should_rewrite;
pub use substitute::rewrite_document;
pub use timestamp::normalize;
