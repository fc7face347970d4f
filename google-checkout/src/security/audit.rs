//! Audit logging for command submissions and notification receipt.
//!
//! Events are emitted on the `audit` tracing target so they can be routed separately
//! from diagnostic logs. Merchant ids are partially redacted and long digit runs in error
//! text are masked before anything is logged.

use std::time::{Duration, SystemTime};

use serde::Serialize;
use uuid::Uuid;

/// Types of auditable events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// A command document was built and is about to be posted.
    CommandSubmitted,
    /// The processor accepted a command.
    CommandAccepted,
    /// The processor answered with an `<error>` document.
    CommandRejected,
    /// The command could not be delivered or the answer was unusable.
    CommandFailed,
    /// An inbound notification was classified.
    NotificationReceived,
    /// An inbound document had a root tag of no known kind.
    NotificationUnrecognized,
    /// The application handler failed; the notification was still acknowledged.
    NotificationHandlerFailed,
}

/// Details for audit log entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditDetails {
    /// Command root tag, for outbound events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Notification kind, for inbound events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_kind: Option<String>,
    /// Serial number of an inbound notification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    /// Endpoint a command was posted to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Sandbox or production.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// HTTP status of the processor's answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Error message (sensitive data automatically redacted).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Duration of the operation in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Audit log entry.
///
/// # Examples
///
/// ```
/// use google_checkout::security::audit::{AuditEvent, AuditEventType};
/// use uuid::Uuid;
///
/// let event = AuditEvent::new(AuditEventType::CommandSubmitted, "1234567890", Uuid::new_v4())
///     .with_command("charge-order")
///     .with_environment("sandbox");
///
/// assert_eq!(event.merchant_id, "******7890");
/// google_checkout::security::audit::audit_log(&event);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    /// Event timestamp.
    pub timestamp: SystemTime,
    /// Event type.
    pub event_type: AuditEventType,
    /// Merchant id, redacted to its last four characters.
    pub merchant_id: String,
    /// Correlation id shared by all events of one submission or receipt.
    pub request_id: Uuid,
    /// Event details.
    pub details: AuditDetails,
}

impl AuditEvent {
    /// Creates an event; `merchant_id` is redacted here.
    #[must_use]
    pub fn new(event_type: AuditEventType, merchant_id: &str, request_id: Uuid) -> Self {
        Self {
            timestamp: SystemTime::now(),
            event_type,
            merchant_id: redact_merchant_id(merchant_id),
            request_id,
            details: AuditDetails::default(),
        }
    }

    /// Adds the command root tag.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.details.command = Some(command.into());
        self
    }

    /// Adds the notification kind.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn with_notification_kind(mut self, kind: impl Into<String>) -> Self {
        self.details.notification_kind = Some(kind.into());
        self
    }

    /// Adds the notification serial number; `None` leaves it unset.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "accepts both a serial number and an optional one"
    )]
    pub fn with_serial_number<'s>(mut self, serial_number: impl Into<Option<&'s str>>) -> Self {
        self.details.serial_number = serial_number.into().map(str::to_owned);
        self
    }

    /// Adds the endpoint URL.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.details.endpoint = Some(endpoint.into());
        self
    }

    /// Adds the environment name.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.details.environment = Some(environment.into());
        self
    }

    /// Adds the HTTP status; `None` when no response arrived.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "accepts both a status and an optional one"
    )]
    pub fn with_status(mut self, status: impl Into<Option<u16>>) -> Self {
        self.details.status = status.into();
        self
    }

    /// Adds an error message, redacting long digit runs; `None` leaves it unset.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "accepts both a message and an optional one"
    )]
    pub fn with_error<'e>(mut self, error: impl Into<Option<&'e str>>) -> Self {
        self.details.error = error.into().map(redact_sensitive);
        self
    }

    /// Adds duration to details.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        reason = "duration in ms fits u64 for practical values"
    )]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.details.duration_ms = Some(duration.as_millis() as u64);
        self
    }
}

/// Logs audit event to tracing with target "audit".
pub fn audit_log(event: &AuditEvent) {
    tracing::info!(
        target: "audit",
        timestamp = ?event.timestamp,
        event_type = ?event.event_type,
        merchant_id = %event.merchant_id,
        request_id = %event.request_id,
        details = ?event.details,
        "AUDIT"
    );
}

/// Digit runs at least this long are masked by [`redact_sensitive`].
const MIN_REDACTED_DIGITS: usize = 12;

/// Masks card-number-like digit runs, keeping the last four digits.
///
/// A run is a sequence of digits optionally separated by single spaces or hyphens. Runs
/// with at least twelve digits have every digit but the last four replaced by `X`;
/// separators are kept.
///
/// # Examples
///
/// ```
/// use google_checkout::security::audit::redact_sensitive;
///
/// assert_eq!(
///     redact_sensitive("card 4111-1111-1111-1234 declined"),
///     "card XXXX-XXXX-XXXX-1234 declined"
/// );
/// assert_eq!(redact_sensitive("order 12345 failed"), "order 12345 failed");
/// ```
#[must_use]
pub fn redact_sensitive(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut output = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            output.push(chars[i]);
            i += 1;
            continue;
        }

        let start = i;
        let mut end = i;
        let mut digits = 0;
        while end < chars.len() {
            if chars[end].is_ascii_digit() {
                digits += 1;
                end += 1;
            } else if matches!(chars[end], ' ' | '-')
                && chars.get(end + 1).is_some_and(char::is_ascii_digit)
            {
                end += 1;
            } else {
                break;
            }
        }

        let run = &chars[start..end];
        if digits >= MIN_REDACTED_DIGITS {
            let mut remaining = digits;
            for &c in run {
                if c.is_ascii_digit() {
                    output.push(if remaining > 4 { 'X' } else { c });
                    remaining -= 1;
                } else {
                    output.push(c);
                }
            }
        } else {
            output.extend(run);
        }
        i = end;
    }

    output
}

/// Shows only the last four characters of a merchant id.
///
/// # Examples
///
/// ```
/// use google_checkout::security::audit::redact_merchant_id;
///
/// assert_eq!(redact_merchant_id("1234567890"), "******7890");
/// assert_eq!(redact_merchant_id("abc"), "abc");
/// ```
#[must_use]
pub fn redact_merchant_id(merchant_id: &str) -> String {
    let len = merchant_id.chars().count();
    if len <= 4 {
        return merchant_id.to_owned();
    }
    let visible: String = merchant_id.chars().skip(len - 4).collect();
    format!("{}{visible}", "*".repeat(len - 4))
}

/// Convenience macro for audit logging.
///
/// # Examples
///
/// ```
/// use google_checkout::{audit, security::audit::AuditEventType};
/// use uuid::Uuid;
///
/// audit!(AuditEventType::NotificationReceived, "1234567890", Uuid::new_v4());
///
/// audit!(
///     AuditEventType::CommandRejected,
///     "1234567890",
///     Uuid::new_v4(),
///     with_command("charge-order"),
///     with_status(400)
/// );
/// ```
#[macro_export]
macro_rules! audit {
    ($event_type:expr, $merchant_id:expr, $request_id:expr) => {
        $crate::security::audit::audit_log(
            &$crate::security::audit::AuditEvent::new($event_type, $merchant_id, $request_id)
        )
    };
    ($event_type:expr, $merchant_id:expr, $request_id:expr, $($method:ident($arg:expr)),+ $(,)?) => {
        $crate::security::audit::audit_log(
            &$crate::security::audit::AuditEvent::new($event_type, $merchant_id, $request_id)
                $(.$method($arg))+
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_card_numbers() {
        let inputs = [
            ("Card: 1234-5678-9012-3456", "Card: XXXX-XXXX-XXXX-3456"),
            ("Card: 1234 5678 9012 3456", "Card: XXXX XXXX XXXX 3456"),
            ("Card: 1234567890123456", "Card: XXXXXXXXXXXX3456"),
        ];

        for (input, expected) in inputs {
            assert_eq!(redact_sensitive(input), expected, "Failed to redact: {input}");
        }
    }

    #[test]
    fn test_redact_google_order_number() {
        assert_eq!(
            redact_sensitive("order 841171949013218 not found"),
            "order XXXXXXXXXXX3218 not found"
        );
    }

    #[test]
    fn test_redact_sensitive_preserves_safe_data() {
        let input = "Order ID: 12345, Amount: $67.89, Date: 2024-01-15, status 400";
        assert_eq!(redact_sensitive(input), input);
    }

    #[test]
    fn test_redact_sensitive_separators_not_swallowed() {
        assert_eq!(redact_sensitive("a - 1 - b"), "a - 1 - b");
        assert_eq!(redact_sensitive("100-"), "100-");
        assert_eq!(redact_sensitive(""), "");
    }

    #[test]
    fn test_redact_multiple_runs() {
        let result = redact_sensitive("1234-5678-9012-3456 and 9876543210987654");
        assert_eq!(result, "XXXX-XXXX-XXXX-3456 and XXXXXXXXXXXX7654");
    }

    #[test]
    fn test_redact_merchant_id() {
        assert_eq!(redact_merchant_id("1234567890"), "******7890");
        assert_eq!(redact_merchant_id("abcde"), "*bcde");
        assert_eq!(redact_merchant_id("abcd"), "abcd");
        assert_eq!(redact_merchant_id(""), "");
    }

    #[test]
    fn test_audit_event_builder() {
        let request_id = Uuid::new_v4();
        let event = AuditEvent::new(AuditEventType::CommandAccepted, "1234567890", request_id)
            .with_command("deliver-order")
            .with_endpoint("https://sandbox.google.com/checkout/cws/v2/Merchant/1234567890/request")
            .with_environment("sandbox")
            .with_status(200)
            .with_duration(Duration::from_millis(1500));

        assert_eq!(event.merchant_id, "******7890");
        assert_eq!(event.request_id, request_id);
        assert_eq!(event.details.command.as_deref(), Some("deliver-order"));
        assert_eq!(event.details.environment.as_deref(), Some("sandbox"));
        assert_eq!(event.details.status, Some(200));
        assert_eq!(event.details.duration_ms, Some(1500));
    }

    #[test]
    fn test_audit_event_notification_details() {
        let event = AuditEvent::new(AuditEventType::NotificationReceived, "42", Uuid::new_v4())
            .with_notification_kind("NewOrder")
            .with_serial_number("bea6bc1b-e1e2-44fe-80ff-0180e33a2614");

        assert_eq!(event.merchant_id, "42");
        assert_eq!(event.details.notification_kind.as_deref(), Some("NewOrder"));
        assert!(event.details.command.is_none());
    }

    #[test]
    fn test_audit_event_with_error() {
        let event = AuditEvent::new(AuditEventType::CommandFailed, "1234567890", Uuid::new_v4())
            .with_error("Payment failed for card 1234-5678-9012-3456");

        let error = event.details.error.unwrap();
        assert!(!error.contains("1234-5678-9012-3456"));
        assert!(error.contains("XXXX-XXXX-XXXX-3456"));
    }

    #[test]
    fn test_optional_details_left_unset_when_absent() {
        let event = AuditEvent::new(AuditEventType::CommandFailed, "1234567890", Uuid::new_v4())
            .with_status(None)
            .with_serial_number(None)
            .with_error(None);

        assert!(event.details.status.is_none());
        assert!(event.details.serial_number.is_none());
        assert!(event.details.error.is_none());

        let event = AuditEvent::new(AuditEventType::CommandFailed, "1234567890", Uuid::new_v4())
            .with_status(Some(503))
            .with_error(Some("card 4111 1111 1111 1111 declined"));
        assert_eq!(event.details.status, Some(503));
        assert_eq!(event.details.error.as_deref(), Some("card XXXX XXXX XXXX 1111 declined"));
    }

    #[test]
    fn test_audit_macro_applies_builders() {
        let serial: Option<String> = None;
        // Expands to `audit_log(&AuditEvent::new(..).with_*(..))`.
        audit!(
            AuditEventType::NotificationHandlerFailed,
            "1234567890",
            Uuid::new_v4(),
            with_notification_kind("ChargeAmount"),
            with_serial_number(serial.as_deref()),
            with_error(Some("order store unavailable")),
        );
        audit!(AuditEventType::NotificationReceived, "1234567890", Uuid::new_v4());
    }

    #[test]
    fn test_audit_event_serialization() {
        let event = AuditEvent::new(AuditEventType::CommandRejected, "1234567890", Uuid::new_v4())
            .with_command("charge-order");

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("command_rejected"));
        assert!(json.contains("charge-order"));
        assert!(json.contains("******7890"));
        assert!(!json.contains("1234567890"));
        assert!(!json.contains("serial_number"));
    }
}
