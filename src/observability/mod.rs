//! Observability subsystem.
//!
//! Structured logging goes through `tracing` (initialized in `main`); this
//! module owns the Prometheus metrics endpoint and the per-request metric
//! updates the server records.

pub mod metrics;
