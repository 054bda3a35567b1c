//! Metrics middleware and exposition endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::http::constants::{ROUTE_FORWARD_AUTH, ROUTE_HEALTHZ, ROUTE_METRICS};
use crate::state::ApiState;

pub(crate) async fn track_requests(
    State(state): State<Arc<ApiState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let route = route_label(req.uri().path());
    let response = next.run(req).await;
    state
        .metrics
        .observe_request(route, response.status().as_u16());
    response
}

// Fixed labels keep the metric cardinality bounded; the catch-all route
// would otherwise mint one label per protected path.
fn route_label(path: &str) -> &'static str {
    match path {
        "/healthz" => ROUTE_HEALTHZ,
        "/metrics" => ROUTE_METRICS,
        _ => ROUTE_FORWARD_AUTH,
    }
}

pub(crate) async fn metrics(State(state): State<Arc<ApiState>>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render metrics").into_response()
        }
    }
}
