//! Logging setup and health reporting for the webhook host.

use std::io;

use serde::Serialize;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output for development.
    Pretty,
    /// One JSON object per line for log aggregation.
    Json,
}

impl LogFormat {
    /// Reads the format from `LOG_FORMAT`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("LOG_FORMAT").unwrap_or_default())
    }

    /// `json` (any case) selects [`LogFormat::Json`]; anything else is pretty.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") { Self::Json } else { Self::Pretty }
    }
}

/// Installs the global tracing subscriber.
///
/// Filtering follows `RUST_LOG` and defaults to `info`. Output goes to stderr with span
/// close events, so every notification's `receive` span is logged with its duration.
/// The library's `audit` target passes through the same filter; use
/// `RUST_LOG=info,audit=info` to keep it when lowering other targets.
///
/// # Examples
///
/// ```no_run
/// use google_checkout_server::observability::{LogFormat, init_observability};
///
/// init_observability(LogFormat::from_env());
/// tracing::info!("ready");
/// ```
pub fn init_observability(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_writer(io::stderr),
                )
                .init();
        }
        LogFormat::Json => {
            subscriber
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_span_list(true)
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_writer(io::stderr),
                )
                .init();
        }
    }
}

/// Overall service status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Every check passed.
    Healthy,
    /// Some check warned.
    Degraded,
    /// Some check failed.
    Unhealthy,
}

/// Outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthCheckStatus {
    /// Check passed.
    Pass,
    /// Operational, but worth a look.
    Warn,
    /// Check failed.
    Fail,
}

/// One named check.
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheck {
    /// Check name.
    pub name: String,
    /// Check outcome.
    pub status: HealthCheckStatus,
    /// Detail, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthCheck {
    /// Passing check with a detail message.
    #[must_use]
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), status: HealthCheckStatus::Pass, message: Some(message.into()) }
    }

    /// Warning check with a detail message.
    #[must_use]
    pub fn warn(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), status: HealthCheckStatus::Warn, message: Some(message.into()) }
    }

    /// Failing check with a detail message.
    #[must_use]
    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), status: HealthCheckStatus::Fail, message: Some(message.into()) }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Worst status among `checks`.
    pub status: HealthStatus,
    /// Server version.
    pub version: String,
    /// Merchant id, redacted to its last four characters.
    pub merchant_id: String,
    /// `sandbox` or `production`.
    pub environment: String,
    /// Seconds since startup.
    pub uptime_secs: u64,
    /// Individual checks.
    pub checks: Vec<HealthCheck>,
}

impl HealthReport {
    /// Worst status among `checks`; healthy when there are none.
    #[must_use]
    pub fn compute_status(checks: &[HealthCheck]) -> HealthStatus {
        if checks.iter().any(|c| c.status == HealthCheckStatus::Fail) {
            HealthStatus::Unhealthy
        } else if checks.iter().any(|c| c.status == HealthCheckStatus::Warn) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}
