//! Inbound notification classification and field access.
//!
//! The processor posts XML documents whose root tag identifies the event, e.g.
//! `<new-order-notification>` or `<charge-amount-notification>`. The same classifier
//! also reads synchronous API responses such as `<request-received>` and `<error>`.
//!
//! [`Notification::parse`] determines the [`NotificationKind`] from the root tag and
//! keeps the parsed [`Document`]. Any element can be read with [`Notification::field`];
//! well-known values have typed accessors on the views returned by `as_*` methods.
//!
//! # Examples
//!
//! ```
//! use google_checkout::notification::{Notification, NotificationKind};
//!
//! let raw = br#"<?xml version="1.0" encoding="UTF-8"?>
//! <new-order-notification xmlns="http://checkout.google.com/schema/2" serial-number="85f54628">
//!   <google-order-number>841171949013218</google-order-number>
//!   <order-total currency="USD">190.98</order-total>
//! </new-order-notification>"#;
//!
//! let notification = Notification::parse(raw).unwrap();
//! assert_eq!(notification.kind(), NotificationKind::NewOrder);
//! assert_eq!(notification.field("google_order_number").as_deref(), Some("841171949013218"));
//!
//! let order = notification.as_new_order().unwrap();
//! assert_eq!(order.order_total().unwrap().amount_minor_units(), 19098);
//! ```

mod views;

use std::fmt;

use tracing::instrument;

pub use views::{ApiErrorView, ChargeAmount, ChargebackAmount, CheckoutRedirect, NewOrder};

use crate::{
    error::{CheckoutError, Result},
    xml::{
        Document, Element,
        writer::{SCHEMA_NAMESPACE, XmlBuilder},
    },
};

/// Kind of an inbound document, derived from its root tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// `new-order-notification`
    NewOrder,
    /// `order-state-change-notification`
    OrderStateChange,
    /// `risk-information-notification`
    RiskInformation,
    /// `charge-amount-notification`
    ChargeAmount,
    /// `chargeback-amount-notification`
    ChargebackAmount,
    /// `authorization-amount-notification`
    AuthorizationAmount,
    /// `refund-amount-notification`
    RefundAmount,
    /// `checkout-redirect`
    CheckoutRedirect,
    /// `request-received`
    RequestReceived,
    /// `error`
    Error,
    /// Any root tag not listed above.
    Unrecognized,
}

impl NotificationKind {
    /// Classifies a root tag name.
    ///
    /// The tag is split on `-` and `_`, each word capitalized and the words joined, so
    /// `new-order-notification` becomes `NewOrderNotification`. Unknown names map to
    /// [`NotificationKind::Unrecognized`].
    ///
    /// # Examples
    ///
    /// ```
    /// use google_checkout::notification::NotificationKind;
    ///
    /// assert_eq!(
    ///     NotificationKind::from_root_tag("order-state-change-notification"),
    ///     NotificationKind::OrderStateChange
    /// );
    /// assert_eq!(NotificationKind::from_root_tag("request-received"), NotificationKind::RequestReceived);
    /// assert_eq!(NotificationKind::from_root_tag("cancel-order"), NotificationKind::Unrecognized);
    /// ```
    #[must_use]
    pub fn from_root_tag(tag: &str) -> Self {
        match camelize(tag).as_str() {
            "NewOrderNotification" => Self::NewOrder,
            "OrderStateChangeNotification" => Self::OrderStateChange,
            "RiskInformationNotification" => Self::RiskInformation,
            "ChargeAmountNotification" => Self::ChargeAmount,
            "ChargebackAmountNotification" => Self::ChargebackAmount,
            "AuthorizationAmountNotification" => Self::AuthorizationAmount,
            "RefundAmountNotification" => Self::RefundAmount,
            "CheckoutRedirect" => Self::CheckoutRedirect,
            "RequestReceived" => Self::RequestReceived,
            "Error" => Self::Error,
            _ => Self::Unrecognized,
        }
    }

    /// Canonical root tag for this kind, `None` for [`NotificationKind::Unrecognized`].
    #[must_use]
    pub const fn root_tag(self) -> Option<&'static str> {
        match self {
            Self::NewOrder => Some("new-order-notification"),
            Self::OrderStateChange => Some("order-state-change-notification"),
            Self::RiskInformation => Some("risk-information-notification"),
            Self::ChargeAmount => Some("charge-amount-notification"),
            Self::ChargebackAmount => Some("chargeback-amount-notification"),
            Self::AuthorizationAmount => Some("authorization-amount-notification"),
            Self::RefundAmount => Some("refund-amount-notification"),
            Self::CheckoutRedirect => Some("checkout-redirect"),
            Self::RequestReceived => Some("request-received"),
            Self::Error => Some("error"),
            Self::Unrecognized => None,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root_tag().unwrap_or("unrecognized"))
    }
}

/// Parsed and classified inbound document.
///
/// Owns its document; created once per [`parse`](Self::parse) call and never mutated.
#[derive(Debug, Clone)]
pub struct Notification {
    kind: NotificationKind,
    document: Document,
}

impl Notification {
    /// Parses raw bytes and classifies the document by its root tag.
    ///
    /// An unknown root tag is not an error; it yields [`NotificationKind::Unrecognized`].
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MalformedDocument`] if `raw` is not well-formed XML.
    #[instrument(skip(raw), fields(len = raw.len(), kind = tracing::field::Empty))]
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let notification = Self::from_document(Document::parse(raw)?);
        tracing::Span::current().record("kind", tracing::field::display(notification.kind));
        Ok(notification)
    }

    /// Classifies an already parsed document.
    #[must_use]
    pub fn from_document(document: Document) -> Self {
        let kind = NotificationKind::from_root_tag(document.root().name());
        Self { kind, document }
    }

    /// Kind derived from the root tag.
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Underlying document, for lookups the field API cannot express.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Consumes the notification and returns its document.
    #[must_use]
    pub fn into_document(self) -> Document {
        self.document
    }

    /// First element anywhere in the document matching `name`.
    ///
    /// `name` is tried verbatim first, then in hyphenated form, so `google_order_number`,
    /// `googleOrderNumber` and `google-order-number` all find `<google-order-number>`.
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.document.find(name).or_else(|| {
            let hyphenated = hyphenate(name);
            (hyphenated != name).then(|| self.document.find(&hyphenated)).flatten()
        })
    }

    /// Text of the first element matching `name`, or `None` if no such element exists.
    ///
    /// The search covers the whole document. When the same tag appears at several depths
    /// (e.g. `email` in both billing and shipping addresses) only the first in document
    /// order is returned.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<String> {
        self.element(name).map(Element::text)
    }

    /// Like [`field`](Self::field), but a missing element is an error.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::UnknownField`] if no element matches `name`.
    pub fn require_field(&self, name: &str) -> Result<String> {
        self.field(name).ok_or_else(|| CheckoutError::UnknownField(hyphenate(name)))
    }

    /// Required element lookup, for typed accessors.
    pub(crate) fn require_element(&self, name: &str) -> Result<&Element> {
        self.element(name).ok_or_else(|| CheckoutError::UnknownField(hyphenate(name)))
    }

    /// `serial-number` attribute of the root element.
    #[must_use]
    pub fn serial_number(&self) -> Option<&str> {
        self.document.root().attribute("serial-number")
    }

    /// Text of `google-order-number`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::UnknownField`] if the document carries no order number.
    pub fn google_order_number(&self) -> Result<String> {
        self.require_field("google-order-number")
    }

    /// Financial order state.
    ///
    /// Reads `financial-order-state`, falling back to `new-financial-order-state` as sent
    /// in state change notifications.
    #[must_use]
    pub fn state(&self) -> Option<String> {
        self.field("financial-order-state").or_else(|| self.field("new-financial-order-state"))
    }

    /// `true` iff this is an `<error>` document.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }

    /// Typed view of a `new-order-notification`.
    #[must_use]
    pub fn as_new_order(&self) -> Option<NewOrder<'_>> {
        (self.kind == NotificationKind::NewOrder).then(|| NewOrder::new(self))
    }

    /// Typed view of a `charge-amount-notification`.
    #[must_use]
    pub fn as_charge_amount(&self) -> Option<ChargeAmount<'_>> {
        (self.kind == NotificationKind::ChargeAmount).then(|| ChargeAmount::new(self))
    }

    /// Typed view of a `chargeback-amount-notification`.
    #[must_use]
    pub fn as_chargeback_amount(&self) -> Option<ChargebackAmount<'_>> {
        (self.kind == NotificationKind::ChargebackAmount).then(|| ChargebackAmount::new(self))
    }

    /// Typed view of a `checkout-redirect` response.
    #[must_use]
    pub fn as_checkout_redirect(&self) -> Option<CheckoutRedirect<'_>> {
        (self.kind == NotificationKind::CheckoutRedirect).then(|| CheckoutRedirect::new(self))
    }

    /// Typed view of an `error` response.
    #[must_use]
    pub fn as_error(&self) -> Option<ApiErrorView<'_>> {
        self.is_error().then(|| ApiErrorView::new(self))
    }

    /// Builds the acknowledgment that confirms receipt to the sender.
    ///
    /// The result is `<notification-acknowledgment xmlns=".." serial-number=".."/>` with the
    /// serial number copied unchanged from the inbound root. A document without a serial
    /// number is acknowledged with an empty one.
    ///
    /// # Errors
    ///
    /// Returns an error only if XML serialization fails.
    pub fn acknowledgment_xml(&self) -> Result<Vec<u8>> {
        let mut builder = XmlBuilder::new()?;
        builder.empty(
            "notification-acknowledgment",
            &[("xmlns", SCHEMA_NAMESPACE), ("serial-number", self.serial_number().unwrap_or(""))],
        )?;
        Ok(builder.finish())
    }
}

fn camelize(tag: &str) -> String {
    tag.split(['-', '_'])
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect()
}

/// Converts `snake_case` and `camelCase` field names to the protocol's `hyphen-case`.
fn hyphenate(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut previous_lower = false;
    for ch in name.chars() {
        if ch == '_' {
            out.push('-');
            previous_lower = false;
        } else if ch.is_uppercase() {
            if previous_lower {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
            previous_lower = false;
        } else {
            out.push(ch);
            previous_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}
