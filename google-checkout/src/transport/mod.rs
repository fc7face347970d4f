//! Transport abstraction for posting command documents.
//!
//! The transport moves bytes: it authenticates, enforces HTTPS and the configured trust
//! roots, and hands back whatever the processor answered. Interpreting the answer is
//! the client's job (see [`crate::client::interpret_response`]), so a transport never
//! turns a 4xx or 5xx status into an error by itself.
//!
//! # Examples
//!
//! ```rust,no_run
//! use google_checkout::{
//!     credentials::MerchantCredentials,
//!     transport::{HttpTransport, RequestContext, Transport},
//! };
//! use url::Url;
//!
//! # async fn example() -> google_checkout::error::Result<()> {
//! let transport = HttpTransport::new()?;
//! let credentials = MerchantCredentials::new("1234567890", "secret");
//! let url = Url::parse("https://sandbox.google.com/checkout/cws/v2/Merchant/1234567890/request")
//!     .unwrap();
//!
//! let ctx = RequestContext::xml(&url, &credentials);
//! let response = transport.post(ctx, b"<?xml version=\"1.0\"?><hello/>").await?;
//! println!("Status: {}", response.status);
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;

use url::Url;

use crate::{credentials::MerchantCredentials, error::Result};

pub mod config;
pub mod http;
mod sealed;

pub use config::{HttpConfig, HttpVersion};
pub use http::HttpTransport;

/// Content type of every command document.
pub const XML_CONTENT_TYPE: &str = "application/xml;charset=UTF-8";

/// Request context for transport operations.
#[derive(Debug, Clone)]
pub struct RequestContext<'a> {
    /// Absolute endpoint URL.
    pub url: &'a Url,
    /// Basic-auth credentials: merchant id as user, merchant key as password.
    pub credentials: &'a MerchantCredentials,
    /// Content-Type header value, echoed as `Accept`.
    pub content_type: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    /// Context for posting an XML document to `url`.
    #[must_use]
    pub const fn xml(url: &'a Url, credentials: &'a MerchantCredentials) -> Self {
        Self { url, credentials, content_type: Some(XML_CONTENT_TYPE) }
    }
}

/// Raw response from the processor.
#[derive(Debug)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body bytes.
    pub body: Vec<u8>,
}

/// Transport protocol abstraction.
///
/// This trait is sealed; only implementations within this crate are allowed.
///
/// # Security
///
/// All transport implementations:
/// - Only send to HTTPS URLs and never to localhost
/// - Validate the server certificate against the configured trust roots
/// - Never follow redirects
/// - Reject a content type containing control characters
pub trait Transport: sealed::private::Sealed + Send + Sync {
    /// Posts `body` and returns the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::TransportError`] for a URL or content type that violates
    /// the policy above, and [`CheckoutError::HttpError`] for connection, TLS or
    /// timeout failures.
    ///
    /// [`CheckoutError::TransportError`]: crate::error::CheckoutError::TransportError
    /// [`CheckoutError::HttpError`]: crate::error::CheckoutError::HttpError
    fn post<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        body: &'a [u8],
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Returns the protocol name for logging.
    fn protocol_name(&self) -> &'static str;
}
