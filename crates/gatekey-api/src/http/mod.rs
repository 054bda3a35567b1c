//! HTTP surface modules (routers, handlers, middleware).

/// Shared constants and header names.
pub(crate) mod constants;
/// The forward-auth catch-all handler.
pub(crate) mod forward;
/// Health endpoint.
pub(crate) mod health;
/// Router construction and server host.
pub mod router;
/// Metrics middleware and exposition endpoint.
pub(crate) mod telemetry;
