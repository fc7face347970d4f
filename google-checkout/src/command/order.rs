//! Commands acting on an existing order.

use rust_decimal::Decimal;

use super::Command;
use crate::{
    credentials::MerchantCredentials,
    error::{CheckoutError, Result},
    money::DEFAULT_CURRENCY,
    xml::writer::{SCHEMA_NAMESPACE, XmlBuilder},
};

/// Longest buyer message the processor will deliver, in characters.
pub const MAX_BUYER_MESSAGE_LEN: usize = 255;

fn require_order_number(google_order_number: &str) -> Result<()> {
    if google_order_number.trim().is_empty() {
        return Err(CheckoutError::MissingRequiredField("google-order-number".to_owned()));
    }
    Ok(())
}

fn order_document<F>(root: &str, google_order_number: &str, body: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut XmlBuilder) -> Result<()>,
{
    let mut builder = XmlBuilder::new()?;
    builder.element(
        root,
        &[("google-order-number", google_order_number), ("xmlns", SCHEMA_NAMESPACE)],
        body,
    )?;
    Ok(builder.finish())
}

/// Charges a previously authorized order.
#[derive(Debug, Clone)]
pub struct ChargeOrder {
    credentials: MerchantCredentials,
    google_order_number: String,
    amount: Decimal,
    currency: String,
}

impl ChargeOrder {
    /// Charge of `amount` in US dollars.
    #[must_use]
    pub fn new(
        credentials: MerchantCredentials,
        google_order_number: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            credentials,
            google_order_number: google_order_number.into(),
            amount,
            currency: DEFAULT_CURRENCY.to_owned(),
        }
    }

    /// Overrides the currency.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Order being charged.
    #[must_use]
    pub fn google_order_number(&self) -> &str {
        &self.google_order_number
    }

    /// Amount to charge.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Currency of the amount.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }
}

impl Command for ChargeOrder {
    fn command_name(&self) -> &'static str {
        "charge-order"
    }

    fn credentials(&self) -> &MerchantCredentials {
        &self.credentials
    }

    /// `<charge-order><amount currency="..">..</amount></charge-order>`
    ///
    /// Fails with [`CheckoutError::InvalidAmount`] unless the amount is positive.
    fn to_xml(&self) -> Result<Vec<u8>> {
        require_order_number(&self.google_order_number)?;
        if self.amount <= Decimal::ZERO {
            return Err(CheckoutError::InvalidAmount(format!(
                "charge amount must be greater than 0, got {}",
                self.amount
            )));
        }
        let amount = self.amount.to_string();
        order_document(self.command_name(), &self.google_order_number, |b| {
            b.leaf("amount", &[("currency", self.currency.as_str())], &amount)
        })
    }
}

/// Marks an order as shipped. The processor is told not to email the buyer.
#[derive(Debug, Clone)]
pub struct DeliverOrder {
    credentials: MerchantCredentials,
    google_order_number: String,
}

impl DeliverOrder {
    /// Delivery notice for `google_order_number`.
    #[must_use]
    pub fn new(credentials: MerchantCredentials, google_order_number: impl Into<String>) -> Self {
        Self { credentials, google_order_number: google_order_number.into() }
    }

    /// Order being delivered.
    #[must_use]
    pub fn google_order_number(&self) -> &str {
        &self.google_order_number
    }
}

impl Command for DeliverOrder {
    fn command_name(&self) -> &'static str {
        "deliver-order"
    }

    fn credentials(&self) -> &MerchantCredentials {
        &self.credentials
    }

    fn to_xml(&self) -> Result<Vec<u8>> {
        require_order_number(&self.google_order_number)?;
        order_document(self.command_name(), &self.google_order_number, |b| {
            b.leaf("send-email", &[], "false")
        })
    }
}

/// Sends a message to the buyer. The processor always emails it.
#[derive(Debug, Clone)]
pub struct SendBuyerMessage {
    credentials: MerchantCredentials,
    google_order_number: String,
    message: String,
}

impl SendBuyerMessage {
    /// Message for the buyer of `google_order_number`.
    #[must_use]
    pub fn new(
        credentials: MerchantCredentials,
        google_order_number: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            google_order_number: google_order_number.into(),
            message: message.into(),
        }
    }

    /// Order whose buyer receives the message.
    #[must_use]
    pub fn google_order_number(&self) -> &str {
        &self.google_order_number
    }

    /// Message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Command for SendBuyerMessage {
    fn command_name(&self) -> &'static str {
        "send-buyer-message"
    }

    fn credentials(&self) -> &MerchantCredentials {
        &self.credentials
    }

    /// Fails with [`CheckoutError::MessageTooLong`] beyond
    /// [`MAX_BUYER_MESSAGE_LEN`] characters.
    fn to_xml(&self) -> Result<Vec<u8>> {
        require_order_number(&self.google_order_number)?;
        let length = self.message.chars().count();
        if length > MAX_BUYER_MESSAGE_LEN {
            return Err(CheckoutError::MessageTooLong { length, max: MAX_BUYER_MESSAGE_LEN });
        }
        if self.message.trim().is_empty() {
            return Err(CheckoutError::MissingRequiredField("message".to_owned()));
        }
        order_document(self.command_name(), &self.google_order_number, |b| {
            b.leaf("message", &[], &self.message)?;
            b.leaf("send-email", &[], "true")
        })
    }
}
