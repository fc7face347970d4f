//! `GET /health`.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use google_checkout::{security::redact_merchant_id, webhook::NotificationHandler};

use crate::{
    AppState,
    observability::{HealthCheck, HealthReport, HealthStatus},
};

/// Reports configuration and notification counters.
///
/// Answers 503 when any check fails, 200 otherwise.
pub async fn check<H: NotificationHandler + 'static>(
    State(state): State<Arc<AppState<H>>>,
) -> (StatusCode, Json<HealthReport>) {
    let report = build_report(&state);
    let status = match report.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
    };
    (status, Json(report))
}

fn build_report<H: NotificationHandler>(state: &AppState<H>) -> HealthReport {
    let merchant_id = state.receiver().merchant_id();
    let configuration = if merchant_id.is_empty() {
        HealthCheck::fail("configuration", "merchant id is empty")
    } else {
        HealthCheck::pass("configuration", format!("receiving for {}", state.environment()))
    };

    let (received, rejected) = (state.received(), state.rejected());
    let notifications = if rejected > received {
        HealthCheck::warn(
            "notifications",
            format!("{rejected} of {} bodies rejected", received + rejected),
        )
    } else {
        HealthCheck::pass("notifications", format!("{received} acknowledged, {rejected} rejected"))
    };

    let checks = vec![configuration, notifications];
    HealthReport {
        status: HealthReport::compute_status(&checks),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        merchant_id: redact_merchant_id(merchant_id),
        environment: state.environment().to_string(),
        uptime_secs: state.uptime_secs(),
        checks,
    }
}
