//! WebDAV timestamp-fixing reverse proxy.
//!
//! Forwards WebDAV traffic to a media-indexing backend and rewrites the
//! `<d:getlastmodified>` values in PROPFIND multi-status responses into
//! RFC1123 GMT, which is what the media-player client ecosystem can parse.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;
pub mod security;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
