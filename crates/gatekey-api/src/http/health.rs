//! Health endpoint.

use std::sync::Arc;

use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use serde::Serialize;

use crate::state::ApiState;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) users: usize,
    pub(crate) secret_set: bool,
    pub(crate) uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<&'static str>,
}

pub(crate) async fn healthz(
    axum::extract::State(state): axum::extract::State<Arc<ApiState>>,
) -> Response {
    let users = state.engine.credential_count();
    // The typed Secret guarantees length at construction; report it anyway
    // for monitoring parity.
    let body = HealthResponse {
        status: if users == 0 { "unhealthy" } else { "healthy" },
        users,
        secret_set: true,
        uptime_seconds: state.uptime_seconds(),
        error: (users == 0).then_some("no users configured"),
    };
    let status = if users == 0 {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (status, Json(body)).into_response()
}
