//! Google Checkout: merchant-side client for the Checkout XML API
//!
//! A Rust library for both directions of the Checkout merchant protocol: it parses
//! and classifies the notifications the processor posts to a merchant, acknowledges
//! them, and builds, signs and submits the commands a merchant sends back.
//!
//! # Architecture
//!
//! ```text
//!                 ┌────────────────────────────────────────────┐
//!  notification   │        google-checkout (this crate)        │
//! ───────────────►│ webhook ─► notification ─► xml::Document   │
//!  ◄── ack XML ───│                                            │
//!                 │ command ─► xml::writer ─► signer (HMAC)    │
//!                 │    │                                       │
//!                 │ client ─► endpoint ─► transport (reqwest)  │
//!                 └──────────────────────────┬─────────────────┘
//!                                            │ HTTPS + Basic auth
//!                                  ┌─────────▼─────────┐
//!                                  │ sandbox.google.com│
//!                                  │checkout.google.com│
//!                                  └───────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## 1. Acknowledge a Notification
//!
//! ```rust
//! use google_checkout::notification::{Notification, NotificationKind};
//!
//! # fn example() -> google_checkout::Result<()> {
//! let raw = br#"<?xml version="1.0" encoding="UTF-8"?>
//! <charge-amount-notification xmlns="http://checkout.google.com/schema/2"
//!     serial-number="95d44287-12b1-4722-bc56-cfaa73f4c0d1">
//!   <google-order-number>841171949013218</google-order-number>
//!   <latest-charge-amount currency="USD">190.98</latest-charge-amount>
//!   <total-charge-amount currency="USD">190.98</total-charge-amount>
//! </charge-amount-notification>"#;
//!
//! let notification = Notification::parse(raw)?;
//! assert_eq!(notification.kind(), NotificationKind::ChargeAmount);
//!
//! if let Some(charge) = notification.as_charge_amount() {
//!     assert_eq!(charge.latest_charge_amount()?.amount_minor_units(), 19098);
//! }
//!
//! let ack = notification.acknowledgment_xml()?;
//! assert!(String::from_utf8_lossy(&ack).contains("95d44287-12b1-4722-bc56-cfaa73f4c0d1"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## 2. Charge an Order
//!
//! ```rust,no_run
//! use google_checkout::{
//!     client::CheckoutClient,
//!     command::ChargeOrder,
//!     config::CheckoutConfig,
//! };
//! use rust_decimal::Decimal;
//!
//! # async fn example() -> google_checkout::Result<()> {
//! let config = CheckoutConfig::from_file("checkout.toml")?;
//! let client = CheckoutClient::from_config(&config)?;
//!
//! let charge = ChargeOrder::new(config.merchant.clone(), "841171949013218", Decimal::new(19098, 2));
//! client.submit(&charge).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## 3. Sign a Cart for a Checkout Form
//!
//! ```rust
//! use google_checkout::{
//!     command::{Cart, LineItem},
//!     config::Environment,
//!     credentials::MerchantCredentials,
//! };
//! use rust_decimal::Decimal;
//!
//! # fn example() -> google_checkout::Result<()> {
//! let mut cart = Cart::new(MerchantCredentials::new("1234567890", "secret"));
//! cart.add_item(LineItem::new("Pancakes", "Flapjacks by mail.", Decimal::new(50, 2)).with_quantity(10))?;
//! cart.set_merchant_private_data("session-id", "a1b2c3")?;
//!
//! let form = cart.checkout_form(Environment::Sandbox)?;
//! assert!(form.action.ends_with("/Merchant/1234567890/checkout"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Module Organization
//!
//! - [`xml`]: document tree, deep element lookup, money and boolean conversion
//! - [`notification`]: classification, field access, typed views, acknowledgments
//! - [`command`]: order commands and the shopping cart
//! - [`signer`]: HMAC-SHA1 signatures over serialized documents
//! - [`client`]: submission and response interpretation
//! - [`webhook`]: notification receipt with handler isolation
//! - [`transport`]: HTTPS transport with configurable trust roots
//! - [`config`], [`credentials`], [`endpoint`]: configuration and endpoint resolution
//! - [`security`]: audit logging with redaction
//! - [`error`]: error taxonomy
//!
//! # Security Considerations
//!
//! - **HTTPS only**: requests to non-HTTPS or loopback URLs are refused
//! - **Certificate validation**: a configured trust bundle replaces the built-in roots;
//!   a missing or empty bundle is an error, never a silent fallback
//! - **Secrets**: the merchant key is zeroized on drop and redacted from `Debug` output
//! - **Signatures**: computed over the exact bytes that are sent; verification is
//!   constant-time
//!
//! # Error Handling
//!
//! All operations return [`Result<T, CheckoutError>`](error::Result):
//!
//! ```rust
//! use google_checkout::{
//!     CheckoutError,
//!     command::{Command, SendBuyerMessage},
//!     credentials::MerchantCredentials,
//! };
//!
//! let credentials = MerchantCredentials::new("1234567890", "secret");
//! let message = SendBuyerMessage::new(credentials, "841171949013218", "x".repeat(300));
//!
//! match message.to_xml() {
//!     Ok(_) => unreachable!(),
//!     Err(CheckoutError::MessageTooLong { length, max }) => {
//!         assert_eq!((length, max), (300, 255));
//!     }
//!     Err(e) => panic!("unexpected error: {e}"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and criterion"
)]

pub mod client;
pub mod command;
pub mod config;
pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod money;
pub mod notification;
pub mod security;
pub mod signer;
pub mod transport;
pub mod webhook;
pub mod xml;

pub use client::CheckoutClient;
pub use config::{CheckoutConfig, Environment};
pub use error::{CheckoutError, Result};
pub use notification::{Notification, NotificationKind};
