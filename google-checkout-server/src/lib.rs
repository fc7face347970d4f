//! Webhook host for Google Checkout notifications.
//!
//! Serves `POST /notifications`, which classifies the posted document, runs the
//! configured [`NotificationHandler`] and answers with the acknowledgment XML, and
//! `GET /health`. Authenticating the caller is left to whatever sits in front of
//! this service.

pub mod error;
pub mod handler;
pub mod observability;
pub mod routes;

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};

use axum::{
    Router,
    routing::{get, post},
};
use google_checkout::{
    config::{CheckoutConfig, Environment},
    webhook::{NotificationHandler, WebhookReceiver},
};
use tower_http::trace::TraceLayer;

/// Shared state of the webhook host.
#[derive(Debug)]
pub struct AppState<H> {
    receiver: WebhookReceiver<H>,
    environment: Environment,
    started: Instant,
    received: AtomicU64,
    rejected: AtomicU64,
}

impl<H: NotificationHandler> AppState<H> {
    /// State for the merchant and environment in `config`.
    #[must_use]
    pub fn new(config: &CheckoutConfig, handler: H) -> Self {
        Self {
            receiver: WebhookReceiver::new(config.merchant.merchant_id(), handler),
            environment: config.environment,
            started: Instant::now(),
            received: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Receiver that handles posted notifications.
    #[must_use]
    pub const fn receiver(&self) -> &WebhookReceiver<H> {
        &self.receiver
    }

    /// Environment the merchant is configured for.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// Seconds since the state was created.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Notifications acknowledged so far.
    #[must_use]
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Bodies refused as malformed so far.
    #[must_use]
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }
}

/// Creates the router with all routes and shared state.
pub fn create_app<H: NotificationHandler + 'static>(state: Arc<AppState<H>>) -> Router {
    Router::new()
        .route("/health", get(routes::health::check::<H>))
        .route("/notifications", post(routes::notifications::receive::<H>))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
