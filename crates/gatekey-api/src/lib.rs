//! HTTP surface for the Gatekey forward-auth service.
//!
//! One router, three surfaces: the catch-all forward-auth handler that the
//! reverse proxy sends every request to, a `/healthz` JSON endpoint and a
//! `/metrics` Prometheus endpoint.

pub mod http;
pub(crate) mod state;

pub use http::router::{ApiServer, ApiServerError};
