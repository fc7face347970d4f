//! Receipt of inbound notifications.
//!
//! The acknowledgment confirms receipt, not business outcome: once a document parses, it
//! is acknowledged even if the application handler fails on it. Only a body that is not
//! XML at all is refused, so the host can answer with a client error and the sender will
//! retry.
//!
//! # Examples
//!
//! ```
//! use google_checkout::{
//!     notification::{Notification, NotificationKind},
//!     webhook::{HandlerError, WebhookReceiver},
//! };
//!
//! let receiver = WebhookReceiver::new("1234567890", |n: &Notification| -> Result<(), HandlerError> {
//!     if n.kind() == NotificationKind::NewOrder {
//!         println!("new order {}", n.google_order_number()?);
//!     }
//!     Ok(())
//! });
//!
//! let ack = receiver
//!     .receive(br#"<new-order-notification serial-number="abc-1"><google-order-number>841171949013218</google-order-number></new-order-notification>"#)
//!     .unwrap();
//! assert!(ack.handled());
//! assert!(String::from_utf8(ack.into_body()).unwrap().contains(r#"serial-number="abc-1""#));
//! ```

use std::fmt;

use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::Result,
    notification::{Notification, NotificationKind},
    security::audit::AuditEventType,
};

/// Error returned by application handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Application logic run for each received notification.
///
/// Implemented for closures taking `&Notification`. Every parsed document is passed in,
/// including [`NotificationKind::Unrecognized`] ones.
pub trait NotificationHandler: Send + Sync {
    /// Processes one notification.
    ///
    /// # Errors
    ///
    /// Any error is logged and audited; the notification is still acknowledged.
    fn handle(&self, notification: &Notification) -> std::result::Result<(), HandlerError>;
}

impl<F> NotificationHandler for F
where
    F: Fn(&Notification) -> std::result::Result<(), HandlerError> + Send + Sync,
{
    fn handle(&self, notification: &Notification) -> std::result::Result<(), HandlerError> {
        self(notification)
    }
}

/// Outcome of receiving one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgment {
    kind: NotificationKind,
    serial_number: Option<String>,
    handled: bool,
    body: Vec<u8>,
}

impl Acknowledgment {
    /// Kind of the received document.
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Serial number of the received document, if it had one.
    #[must_use]
    pub fn serial_number(&self) -> Option<&str> {
        self.serial_number.as_deref()
    }

    /// `false` if the handler returned an error.
    #[must_use]
    pub const fn handled(&self) -> bool {
        self.handled
    }

    /// Acknowledgment XML to send back with a success status.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Consumes the acknowledgment, returning the XML body.
    #[must_use]
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

/// Classifies inbound documents, runs the handler and builds acknowledgments.
pub struct WebhookReceiver<H> {
    merchant_id: String,
    handler: H,
}

impl<H: NotificationHandler> WebhookReceiver<H> {
    /// Receiver for notifications addressed to `merchant_id`.
    #[must_use]
    pub fn new(merchant_id: impl Into<String>, handler: H) -> Self {
        Self { merchant_id: merchant_id.into(), handler }
    }

    /// Merchant whose notifications this receiver accepts.
    #[must_use]
    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    /// Receives one raw notification body.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MalformedDocument`] if `raw` is not well-formed XML. Handler
    /// failures are not errors.
    ///
    /// [`CheckoutError::MalformedDocument`]: crate::error::CheckoutError::MalformedDocument
    #[instrument(
        skip(self, raw),
        fields(len = raw.len(), kind = tracing::field::Empty, serial_number = tracing::field::Empty)
    )]
    pub fn receive(&self, raw: &[u8]) -> Result<Acknowledgment> {
        let notification = Notification::parse(raw).inspect_err(|e| {
            tracing::warn!(error = %e, "rejecting unparseable notification");
        })?;
        let kind = notification.kind();
        let serial_number = notification.serial_number().map(str::to_owned);
        let body = notification.acknowledgment_xml()?;

        let span = tracing::Span::current();
        span.record("kind", tracing::field::display(kind));
        if let Some(serial) = &serial_number {
            span.record("serial_number", serial.as_str());
        }

        let request_id = Uuid::new_v4();
        let event_type = if kind == NotificationKind::Unrecognized {
            tracing::warn!(
                root = notification.document().root().name(),
                "notification with unrecognized root tag"
            );
            AuditEventType::NotificationUnrecognized
        } else {
            AuditEventType::NotificationReceived
        };
        crate::audit!(
            event_type,
            &self.merchant_id,
            request_id,
            with_notification_kind(kind.to_string()),
            with_serial_number(serial_number.as_deref()),
        );

        let handled = match self.handler.handle(&notification) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "notification handler failed");
                crate::audit!(
                    AuditEventType::NotificationHandlerFailed,
                    &self.merchant_id,
                    request_id,
                    with_notification_kind(kind.to_string()),
                    with_serial_number(serial_number.as_deref()),
                    with_error(e.to_string().as_str()),
                );
                false
            }
        };

        Ok(Acknowledgment { kind, serial_number, handled, body })
    }
}

impl<H> fmt::Debug for WebhookReceiver<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookReceiver")
            .field("merchant_id", &self.merchant_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::error::CheckoutError;

    const NEW_ORDER: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<new-order-notification xmlns="http://checkout.google.com/schema/2" serial-number="bea6bc1b-e1e2-44fe-80ff-0180e33a2614">
  <google-order-number>841171949013218</google-order-number>
  <fulfillment-order-state>NEW</fulfillment-order-state>
</new-order-notification>"#;

    fn ok(_: &Notification) -> std::result::Result<(), HandlerError> {
        Ok(())
    }

    #[test]
    fn test_receive_acknowledges_with_serial_number() {
        let receiver = WebhookReceiver::new("1234567890", ok);
        let ack = receiver.receive(NEW_ORDER).unwrap();

        assert_eq!(ack.kind(), NotificationKind::NewOrder);
        assert_eq!(ack.serial_number(), Some("bea6bc1b-e1e2-44fe-80ff-0180e33a2614"));
        assert!(ack.handled());
        let body = String::from_utf8(ack.body().to_vec()).unwrap();
        assert!(body.contains("<notification-acknowledgment"));
        assert!(body.contains(r#"serial-number="bea6bc1b-e1e2-44fe-80ff-0180e33a2614""#));
    }

    #[test]
    fn test_handler_sees_notification() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let receiver = WebhookReceiver::new("1", move |n: &Notification| -> std::result::Result<(), HandlerError> {
            assert_eq!(n.google_order_number()?, "841171949013218");
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        receiver.receive(NEW_ORDER).unwrap();
        receiver.receive(NEW_ORDER).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_handler_failure_still_acknowledged() {
        let receiver = WebhookReceiver::new("1", |_: &Notification| -> std::result::Result<(), HandlerError> {
            Err("database unavailable".into())
        });

        let ack = receiver.receive(NEW_ORDER).unwrap();
        assert!(!ack.handled());
        assert!(String::from_utf8(ack.into_body()).unwrap().contains("bea6bc1b"));
    }

    #[test]
    fn test_unrecognized_root_acknowledged_and_passed_to_handler() {
        let kinds = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&kinds);
        let receiver = WebhookReceiver::new("1", move |n: &Notification| -> std::result::Result<(), HandlerError> {
            sink.lock().unwrap().push(n.kind());
            Ok(())
        });

        let ack = receiver.receive(br#"<merchant-calculation-callback serial-number="s-9"/>"#).unwrap();
        assert_eq!(ack.kind(), NotificationKind::Unrecognized);
        assert_eq!(ack.serial_number(), Some("s-9"));
        assert_eq!(*kinds.lock().unwrap(), vec![NotificationKind::Unrecognized]);
    }

    #[test]
    fn test_malformed_body_rejected() {
        let receiver = WebhookReceiver::new("1", ok);
        for raw in [&b""[..], b"not xml", b"<open>"] {
            assert!(matches!(receiver.receive(raw), Err(CheckoutError::MalformedDocument(_))));
        }
    }

    #[test]
    fn test_missing_serial_number_acknowledged_empty() {
        let receiver = WebhookReceiver::new("1", ok);
        let ack = receiver.receive(b"<request-received/>").unwrap();
        assert_eq!(ack.serial_number(), None);
        assert!(String::from_utf8(ack.into_body()).unwrap().contains(r#"serial-number="""#));
    }

    #[test]
    fn test_debug_omits_handler() {
        let receiver = WebhookReceiver::new("1234567890", ok);
        assert!(format!("{receiver:?}").contains("1234567890"));
    }
}
