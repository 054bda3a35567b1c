//! Shared state threaded through the router.

use std::time::Instant;

use gatekey_core::DecisionEngine;
use gatekey_telemetry::Metrics;

/// Process-wide dependencies shared by all handlers.
///
/// Everything here is immutable after construction, so the state is shared
/// behind an `Arc` without any locking.
pub(crate) struct ApiState {
    pub(crate) engine: DecisionEngine,
    pub(crate) login_page: Vec<u8>,
    pub(crate) metrics: Metrics,
    started_at: Instant,
}

impl ApiState {
    pub(crate) fn new(engine: DecisionEngine, login_page: Vec<u8>, metrics: Metrics) -> Self {
        Self {
            engine,
            login_page,
            metrics,
            started_at: Instant::now(),
        }
    }

    pub(crate) fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
