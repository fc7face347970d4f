//! Outbound commands.
//!
//! Every command serializes to a deterministic XML document beginning with
//! `<?xml version="1.0" encoding="UTF-8"?>` and whose root carries the
//! `http://checkout.google.com/schema/2` namespace. Validation happens inside
//! [`Command::to_xml`], so a command that would be rejected fails before any
//! request is sent.
//!
//! # Examples
//!
//! ```
//! use google_checkout::{
//!     command::{ChargeOrder, Command},
//!     credentials::MerchantCredentials,
//! };
//! use rust_decimal::Decimal;
//!
//! let credentials = MerchantCredentials::new("1234567890", "secret");
//! let charge = ChargeOrder::new(credentials, "841171949013218", Decimal::new(12345, 2));
//! let xml = String::from_utf8(charge.to_xml().unwrap()).unwrap();
//! assert!(xml.contains(r#"<amount currency="USD">123.45</amount>"#));
//! ```

mod button;
mod cart;
mod order;

pub use button::{ButtonKind, ButtonOptions, ButtonSize};
pub use cart::{Cart, CheckoutForm, LineItem, ShipFrom, ShippingSpec, ToLineItem};
pub use order::{ChargeOrder, DeliverOrder, MAX_BUYER_MESSAGE_LEN, SendBuyerMessage};

use crate::{credentials::MerchantCredentials, endpoint::EndpointKind, error::Result};

/// A document that can be submitted to the processor.
pub trait Command {
    /// Root tag of the document, used for logging.
    fn command_name(&self) -> &'static str;

    /// Credentials used to authenticate the submission.
    fn credentials(&self) -> &MerchantCredentials;

    /// Endpoint the document is posted to.
    fn endpoint_kind(&self) -> EndpointKind {
        EndpointKind::Request
    }

    /// Validates and serializes the command.
    ///
    /// # Errors
    ///
    /// Returns a validation error ([`CheckoutError::is_validation`]) if the command is
    /// incomplete or violates a processor limit.
    ///
    /// [`CheckoutError::is_validation`]: crate::error::CheckoutError::is_validation
    fn to_xml(&self) -> Result<Vec<u8>>;
}
