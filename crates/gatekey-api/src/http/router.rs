//! Router construction and server host.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use gatekey_core::DecisionEngine;
use gatekey_telemetry::Metrics;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::http::forward::forward_auth;
use crate::http::health::healthz;
use crate::http::telemetry::{metrics as metrics_handler, track_requests};
use crate::state::ApiState;

/// Errors from hosting the HTTP listener.
#[derive(Debug, Error)]
pub enum ApiServerError {
    /// Binding the listener failed.
    #[error("failed to bind listener")]
    Bind {
        /// Address that could not be bound.
        addr: SocketAddr,
        /// Source IO error.
        source: io::Error,
    },
    /// The server terminated abnormally.
    #[error("server terminated abnormally")]
    Serve {
        /// Source IO error.
        source: io::Error,
    },
}

/// Axum router wrapper that hosts the Gatekey service.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Construct the server with its immutable dependencies wired through
    /// shared application state.
    #[must_use]
    pub fn new(engine: DecisionEngine, login_page: Vec<u8>, metrics: Metrics) -> Self {
        let state = Arc::new(ApiState::new(engine, login_page, metrics));
        let router = Router::new()
            .route("/healthz", get(healthz))
            .route("/metrics", get(metrics_handler))
            .fallback(forward_auth)
            .layer(middleware::from_fn_with_state(
                Arc::clone(&state),
                track_requests,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(state);
        Self { router }
    }

    /// Clone of the underlying router, for in-process testing.
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind `addr` and serve until the task is stopped.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound or the server loop
    /// terminates abnormally.
    pub async fn serve(self, addr: SocketAddr) -> Result<(), ApiServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })?;
        info!(addr = %addr, "Launching forward-auth listener");
        axum::serve(listener, self.router)
            .await
            .map_err(|source| ApiServerError::Serve { source })
    }
}
