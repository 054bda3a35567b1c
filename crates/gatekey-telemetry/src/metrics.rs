//! Prometheus-backed metrics registry.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Counters only; the service holds no per-request state worth gauging.

use std::sync::Arc;

use anyhow::Result;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;

// Outcome label values for auth_attempts_total.
const OUTCOME_SUCCEEDED: &str = "succeeded";
const OUTCOME_FAILED: &str = "failed";

/// Prometheus-backed metrics registry shared across the service.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    auth_attempts_total: IntCounterVec,
    tokens_issued_total: IntCounter,
}

/// Snapshot of the auth counters for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Total requests that resolved to an authenticated identity.
    pub auth_succeeded_total: u64,
    /// Total requests denied.
    pub auth_failed_total: u64,
    /// Total session tokens minted.
    pub tokens_issued_total: u64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors
    /// registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests received"),
            &["route", "code"],
        )?;
        let auth_attempts_total = IntCounterVec::new(
            Opts::new(
                "auth_attempts_total",
                "Authentication decisions by outcome",
            ),
            &["outcome"],
        )?;
        let tokens_issued_total = IntCounter::with_opts(Opts::new(
            "tokens_issued_total",
            "Session tokens minted on successful logins",
        ))?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(auth_attempts_total.clone()))?;
        registry.register(Box::new(tokens_issued_total.clone()))?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                auth_attempts_total,
                tokens_issued_total,
            }),
        })
    }

    /// Count one handled HTTP request.
    pub fn observe_request(&self, route: &str, code: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &code.to_string()])
            .inc();
    }

    /// Count one authentication decision.
    pub fn record_auth(&self, succeeded: bool) {
        let outcome = if succeeded {
            OUTCOME_SUCCEEDED
        } else {
            OUTCOME_FAILED
        };
        self.inner
            .auth_attempts_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Count one minted session token.
    pub fn inc_token_issued(&self) {
        self.inner.tokens_issued_total.inc();
    }

    /// Snapshot the auth counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            auth_succeeded_total: self
                .inner
                .auth_attempts_total
                .with_label_values(&[OUTCOME_SUCCEEDED])
                .get(),
            auth_failed_total: self
                .inner
                .auth_attempts_total
                .with_label_values(&[OUTCOME_FAILED])
                .get(),
            tokens_issued_total: self.inner.tokens_issued_total.get(),
        }
    }

    /// Render the registry in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.inner.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
