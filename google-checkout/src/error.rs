//! Error types for the Google Checkout client.
//!
//! Every fallible operation in this crate returns [`Result`], whose error type is
//! [`CheckoutError`]. All variants implement [`std::error::Error`] via [`thiserror::Error`].
//!
//! # Error Categories
//!
//! - **Document Errors** ([`CheckoutError::MalformedDocument`], [`CheckoutError::UnknownField`]):
//!   inbound XML that cannot be parsed or lacks a requested element
//! - **Validation Errors** ([`CheckoutError::InvalidAmount`], [`CheckoutError::MessageTooLong`],
//!   [`CheckoutError::EmptyCart`], [`CheckoutError::MissingRequiredField`],
//!   [`CheckoutError::MixedCurrency`], [`CheckoutError::InvalidInput`]): raised while building a
//!   command, before any network I/O
//! - **Remote Errors** ([`CheckoutError::ApiError`], [`CheckoutError::UnexpectedResponse`]): the
//!   processor answered, but not with an acceptance
//! - **Transport Errors** ([`CheckoutError::HttpError`], [`CheckoutError::TransportError`]):
//!   connection, TLS, timeout or URL policy failures
//!
//! # Examples
//!
//! ```
//! use google_checkout::error::{CheckoutError, Result};
//!
//! fn require_order_number(number: &str) -> Result<&str> {
//!     if number.is_empty() {
//!         return Err(CheckoutError::MissingRequiredField("google-order-number".to_owned()));
//!     }
//!     Ok(number)
//! }
//!
//! assert!(require_order_number("").is_err());
//! ```

use thiserror::Error;

use crate::config::Environment;

/// Result type alias for checkout operations.
///
/// All fallible functions in this crate return this type.
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Errors that can occur while talking to the checkout processor.
///
/// # Error Recovery
///
/// - **Transient errors** ([`HttpError`](Self::HttpError)): the caller owns retry policy; nothing
///   is retried internally
/// - **Validation errors**: fix the input and rebuild the command
/// - **Remote errors** ([`ApiError`](Self::ApiError)): inspect the processor's message; the
///   environment tells you whether sandbox or production credentials were rejected
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Input bytes are not a well-formed XML document, or a value inside it could not be
    /// interpreted (e.g. monetary text that is not a decimal number).
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// A field was requested that does not exist anywhere in the document.
    ///
    /// Carries the hyphenated tag name that was searched for.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Monetary amount is not acceptable (non-positive charge, or out of range).
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Buyer message exceeds the processor's limit.
    #[error("Message too long: {length} characters (maximum {max})")]
    MessageTooLong {
        /// Length of the rejected message, in characters.
        length: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// A cart was serialized without any line items.
    #[error("Cart must contain at least one item")]
    EmptyCart,

    /// A required field was empty.
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// Cart items disagree on currency.
    #[error("Mixed currencies in cart: {first} and {second}")]
    MixedCurrency {
        /// Currency of the first item.
        first: String,
        /// First conflicting currency found.
        second: String,
    },

    /// Input failed validation for a reason not covered by a more specific variant.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The processor returned a structured `<error>` document.
    ///
    /// # Examples
    ///
    /// ```
    /// use google_checkout::{config::Environment, error::CheckoutError};
    ///
    /// let err = CheckoutError::ApiError {
    ///     message: "Bad username and/or password for API Access.".to_owned(),
    ///     environment: Environment::Sandbox,
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Bad username and/or password for API Access. [in sandbox]"
    /// );
    /// ```
    #[error("{message} [in {environment}]")]
    ApiError {
        /// Text of the `error-message` element.
        message: String,
        /// Environment the request was sent to.
        environment: Environment,
    },

    /// HTTP status outside the success and client-error classes.
    #[error("Unexpected response code: {status}")]
    UnexpectedResponse {
        /// Raw HTTP status code.
        status: u16,
    },

    /// HTTP request failed (connection refused, DNS, TLS validation, timeout).
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Transport refused to send the request, or could not be constructed.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Configuration could not be parsed or holds invalid values.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Cryptographic operation failed.
    #[error("Cryptographic operation failed: {0}")]
    CryptoError(String),
}

impl CheckoutError {
    /// Returns `true` for failures raised before any request was sent.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_)
                | Self::MessageTooLong { .. }
                | Self::EmptyCart
                | Self::MissingRequiredField(_)
                | Self::MixedCurrency { .. }
                | Self::InvalidInput(_)
        )
    }
}
