//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, forwarding)
//!     → request.rs (request ID stamping)
//!     → [upstream indexer answers]
//!     → rewrite (multi-status timestamp fix, when eligible)
//!     → response.rs (header hygiene, content-length)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::{HttpServer, UpstreamTarget};
