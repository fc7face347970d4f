//! Default notification handler.

use google_checkout::{
    notification::{Notification, NotificationKind},
    webhook::{HandlerError, NotificationHandler},
};

/// Logs each notification's kind, order number and financial state.
///
/// Stands in for application logic; orders are not persisted.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandler;

impl NotificationHandler for LoggingHandler {
    fn handle(&self, notification: &Notification) -> Result<(), HandlerError> {
        let kind = notification.kind();
        let order = notification.field("google-order-number");
        match kind {
            NotificationKind::Unrecognized => {
                tracing::info!(root = notification.document().root().name(), "ignoring notification");
            }
            NotificationKind::Error => {
                let message = notification.as_error().map(|e| e.message()).unwrap_or_default();
                tracing::warn!(%message, "error document posted to webhook");
            }
            _ => {
                tracing::info!(
                    %kind,
                    order = order.as_deref().unwrap_or("-"),
                    state = notification.state().as_deref().unwrap_or("-"),
                    "notification"
                );
            }
        }
        Ok(())
    }
}
