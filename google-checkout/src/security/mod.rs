//! Security controls: audit logging with redaction.
//!
//! Credentials are handled in [`crate::credentials`] (zeroized, never printed) and
//! signatures in [`crate::signer`]; this module covers what gets written to logs.
//!
//! # Audit Logging
//!
//! ```rust
//! use google_checkout::security::audit::{AuditEvent, AuditEventType};
//! use uuid::Uuid;
//!
//! let event = AuditEvent::new(AuditEventType::CommandFailed, "1234567890", Uuid::new_v4())
//!     .with_command("charge-order")
//!     .with_error("connection reset");
//!
//! google_checkout::security::audit::audit_log(&event);
//! ```
//!
//! Or use the convenience macro:
//!
//! ```rust
//! use google_checkout::{audit, security::audit::AuditEventType};
//! use uuid::Uuid;
//!
//! audit!(
//!     AuditEventType::NotificationUnrecognized,
//!     "1234567890",
//!     Uuid::new_v4(),
//!     with_notification_kind("Unrecognized")
//! );
//! ```

pub mod audit;

pub use audit::{
    AuditDetails, AuditEvent, AuditEventType, audit_log, redact_merchant_id, redact_sensitive,
};
