use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{Unit, counter, describe_counter, describe_histogram, histogram};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, Span, info, info_span, warn};
use uuid::Uuid;

use crate::api::AppState;
use crate::constants::metric;

/// Registers help text for every series the crate emits. Call once after the
/// Prometheus recorder is installed.
pub fn describe_metrics() {
    describe_counter!(
        metric::HTTP_REQUESTS,
        "HTTP requests by method, route template and status"
    );
    describe_histogram!(
        metric::HTTP_REQUEST_DURATION,
        Unit::Seconds,
        "HTTP request latency by method, route template and status"
    );
    describe_counter!(
        metric::ACCOUNT_REGISTRATIONS,
        "Accounts created through registration"
    );
    describe_counter!(
        metric::ACCOUNT_ACTIVATIONS,
        "Accounts activated with their activation key"
    );
    describe_counter!(
        metric::PASSWORD_RESETS_REQUESTED,
        "Reset keys issued to activated accounts"
    );
    describe_counter!(
        metric::PASSWORD_RESETS_COMPLETED,
        "Passwords replaced through a valid reset key"
    );
    describe_counter!(
        metric::ACCOUNTS_PURGED,
        "Unactivated accounts removed by the cleanup job"
    );
    describe_counter!(
        metric::CLEANUP_RUNS,
        "Cleanup job runs by outcome"
    );
}

/// `GET /api/metrics` renders the Prometheus text format.
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.prometheus_handle {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::NOT_FOUND,
            "Metrics are disabled in config".to_string(),
        ),
    }
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();

    // Unmatched paths share one label so scanners cannot grow the series set.
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or("unmatched", MatchedPath::as_str)
        .to_string();

    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %method,
        route = %route,
        status = tracing::field::Empty,
    );

    async move {
        let response = next.run(req).await;
        let elapsed = start.elapsed();
        let status = response.status();
        Span::current().record("status", status.as_u16());

        let labels = [
            ("method", method.to_string()),
            ("route", route),
            ("status", status.as_u16().to_string()),
        ];
        counter!(metric::HTTP_REQUESTS, &labels).increment(1);
        histogram!(metric::HTTP_REQUEST_DURATION, &labels).record(elapsed.as_secs_f64());

        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        if status.is_server_error() {
            warn!(event = "http_request_failed", duration_ms, "Request failed");
        } else {
            info!(event = "http_request_finished", duration_ms, "Request finished");
        }

        response
    }
    .instrument(span)
    .await
}

/// Account payloads must never be cached by intermediaries.
pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );

    response
}
