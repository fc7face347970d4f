//! Command submission and response interpretation.
//!
//! A submission is exactly one POST: the command is validated and serialized first, then
//! sent to the endpoint for its kind, and the answer is classified like any inbound
//! document. Nothing is retried.
//!
//! | HTTP status | Outcome |
//! |---|---|
//! | 2xx, 4xx | body classified; `error` root → [`CheckoutError::ApiError`], unknown root → [`CheckoutError::MalformedDocument`] |
//! | anything else | [`CheckoutError::UnexpectedResponse`], body ignored |

use std::time::{Duration, Instant};

use tracing::instrument;
use uuid::Uuid;

use crate::{
    command::Command,
    config::{CheckoutConfig, Environment},
    endpoint::{ConfigurableEndpointResolver, EndpointResolver},
    error::{CheckoutError, Result},
    notification::{Notification, NotificationKind},
    security::audit::AuditEventType,
    transport::{HttpTransport, RequestContext, Transport, TransportResponse},
};

/// Client for the merchant `request` and `checkout` endpoints.
///
/// Holds no mutable state, so one client can be shared by any number of tasks.
///
/// # Examples
///
/// ```rust,no_run
/// use google_checkout::{
///     client::CheckoutClient,
///     command::DeliverOrder,
///     config::CheckoutConfig,
/// };
///
/// # async fn example() -> google_checkout::error::Result<()> {
/// let config = CheckoutConfig::from_file("checkout.toml")?;
/// let client = CheckoutClient::from_config(&config)?;
///
/// let deliver = DeliverOrder::new(config.merchant.clone(), "841171949013218");
/// let answer = client.submit(&deliver).await?;
/// println!("processor answered with {}", answer.kind());
/// # Ok(())
/// # }
/// ```
pub struct CheckoutClient<T: Transport = HttpTransport> {
    transport: T,
    resolver: Box<dyn EndpointResolver>,
}

impl CheckoutClient<HttpTransport> {
    /// Builds an HTTP client from validated configuration.
    ///
    /// The trust bundle is loaded here, before the client can be shared.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::ConfigError`] for invalid configuration and
    /// [`CheckoutError::TransportError`] if the trust bundle cannot be loaded.
    pub fn from_config(config: &CheckoutConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::with_config(&config.http)?;
        let resolver = ConfigurableEndpointResolver::new(config.environment, &config.endpoints);
        Ok(Self::new(transport, resolver))
    }
}

impl<T: Transport> CheckoutClient<T> {
    /// Creates a client from a transport and an endpoint resolver.
    #[must_use]
    pub fn new(transport: T, resolver: impl EndpointResolver + 'static) -> Self {
        Self { transport, resolver: Box::new(resolver) }
    }

    /// Environment requests are sent to.
    #[must_use]
    pub fn environment(&self) -> Environment {
        self.resolver.environment()
    }

    /// Validates, serializes and posts `command`, returning the classified answer.
    ///
    /// # Errors
    ///
    /// - validation errors from [`Command::to_xml`], before anything is sent
    /// - [`CheckoutError::HttpError`] or [`CheckoutError::TransportError`] if the request
    ///   could not be delivered
    /// - [`CheckoutError::ApiError`], [`CheckoutError::UnexpectedResponse`] or
    ///   [`CheckoutError::MalformedDocument`] per [`interpret_response`]
    pub async fn submit<C>(&self, command: &C) -> Result<Notification>
    where
        C: Command + Sync + ?Sized,
    {
        self.dispatch(command, None).await
    }

    /// As [`submit`](Self::submit), giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// As [`submit`](Self::submit), plus [`CheckoutError::TransportError`] when the
    /// timeout expires.
    pub async fn submit_with_timeout<C>(&self, command: &C, timeout: Duration) -> Result<Notification>
    where
        C: Command + Sync + ?Sized,
    {
        self.dispatch(command, Some(timeout)).await
    }

    #[instrument(
        skip(self, command, timeout),
        fields(
            command = command.command_name(),
            environment = %self.environment(),
            protocol = self.transport.protocol_name(),
            request_id = tracing::field::Empty
        )
    )]
    async fn dispatch<C>(&self, command: &C, timeout: Option<Duration>) -> Result<Notification>
    where
        C: Command + Sync + ?Sized,
    {
        let body = command.to_xml()?;
        let credentials = command.credentials();
        let url = self.resolver.resolve(command.endpoint_kind(), credentials.merchant_id())?;
        let environment = self.environment();

        let request_id = Uuid::new_v4();
        tracing::Span::current().record("request_id", tracing::field::display(request_id));
        crate::audit!(
            AuditEventType::CommandSubmitted,
            credentials.merchant_id(),
            request_id,
            with_command(command.command_name()),
            with_endpoint(url.as_str()),
            with_environment(environment.to_string()),
        );

        let started = Instant::now();
        let post = self.transport.post(RequestContext::xml(&url, credentials), &body);
        let response = match timeout {
            Some(limit) => tokio::time::timeout(limit, post).await.unwrap_or_else(|_| {
                Err(CheckoutError::TransportError(format!("request timed out after {limit:?}")))
            }),
            None => post.await,
        };

        let (status, result) = match response {
            Ok(TransportResponse { status, body }) => {
                (Some(status), interpret_response(status, &body, environment))
            }
            Err(e) => (None, Err(e)),
        };

        let event_type = match &result {
            Ok(_) => AuditEventType::CommandAccepted,
            Err(CheckoutError::ApiError { .. }) => AuditEventType::CommandRejected,
            Err(_) => AuditEventType::CommandFailed,
        };
        let error = result.as_ref().err().map(ToString::to_string);
        if let Some(e) = &error {
            tracing::warn!(error = %e, "command not accepted");
        }
        crate::audit!(
            event_type,
            credentials.merchant_id(),
            request_id,
            with_command(command.command_name()),
            with_environment(environment.to_string()),
            with_status(status),
            with_error(error.as_deref()),
            with_duration(started.elapsed()),
        );

        result
    }
}

impl<T: Transport + std::fmt::Debug> std::fmt::Debug for CheckoutClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutClient")
            .field("transport", &self.transport)
            .field("environment", &self.environment())
            .finish_non_exhaustive()
    }
}

/// Turns a processor answer into a [`Notification`] or an error.
///
/// Success and client-error statuses both carry a document; any other status fails
/// without looking at the body.
///
/// # Errors
///
/// - [`CheckoutError::UnexpectedResponse`] for 1xx, 3xx and 5xx
/// - [`CheckoutError::MalformedDocument`] if the body is not XML or its root is no known kind
/// - [`CheckoutError::ApiError`] if the root is `error`, carrying its `error-message`
///
/// # Examples
///
/// ```
/// use google_checkout::{client::interpret_response, config::Environment, error::CheckoutError};
///
/// let body = br#"<?xml version="1.0" encoding="UTF-8"?>
/// <error xmlns="http://checkout.google.com/schema/2" serial-number="3c39">
///   <error-message>Bad username and/or password for API Access.</error-message>
/// </error>"#;
///
/// let err = interpret_response(400, body, Environment::Sandbox).unwrap_err();
/// assert_eq!(err.to_string(), "Bad username and/or password for API Access. [in sandbox]");
///
/// let err = interpret_response(302, body, Environment::Sandbox).unwrap_err();
/// assert!(matches!(err, CheckoutError::UnexpectedResponse { status: 302 }));
/// ```
pub fn interpret_response(status: u16, body: &[u8], environment: Environment) -> Result<Notification> {
    if !matches!(status, 200..=299 | 400..=499) {
        return Err(CheckoutError::UnexpectedResponse { status });
    }

    let notification = Notification::parse(body)?;
    match notification.kind() {
        NotificationKind::Error => Err(CheckoutError::ApiError {
            message: notification.as_error().map(|e| e.message()).unwrap_or_default(),
            environment,
        }),
        NotificationKind::Unrecognized => Err(CheckoutError::MalformedDocument(format!(
            "response root <{}> is not a known document",
            notification.document().root().name()
        ))),
        _ => Ok(notification),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::{
        command::{Cart, ChargeOrder, LineItem, SendBuyerMessage},
        credentials::MerchantCredentials,
        endpoint::DefaultEndpointResolver,
        transport::mock::{MockTransport, Reply},
    };

    const REQUEST_RECEIVED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<request-received xmlns="http://checkout.google.com/schema/2" serial-number="bea6bc1b-e1e2-44fe-80ff-0180e33a2614"/>"#;

    const ERROR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<error xmlns="http://checkout.google.com/schema/2" serial-number="3c394432-8270-411b-9239-98c2c499f87f">
  <error-message>Bad username and/or password for API Access.</error-message>
</error>"#;

    const CHECKOUT_REDIRECT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<checkout-redirect xmlns="http://checkout.google.com/schema/2" serial-number="a7f6b7d8-2d5e-4a1c-9d2e-8b3c4d5e6f70">
  <redirect-url>https://checkout.google.com/buy?foo=bar&amp;amp;id=8572098456</redirect-url>
</checkout-redirect>"#;

    fn credentials() -> MerchantCredentials {
        MerchantCredentials::new("1234567890", "secret")
    }

    fn charge() -> ChargeOrder {
        ChargeOrder::new(credentials(), "841171949013218", Decimal::new(12345, 2))
    }

    fn client(transport: MockTransport) -> CheckoutClient<MockTransport> {
        CheckoutClient::new(transport, DefaultEndpointResolver::new(Environment::Sandbox))
    }

    #[test]
    fn test_interpret_success_and_client_error_bodies() {
        for status in [200, 201, 299, 400, 401, 499] {
            let notification =
                interpret_response(status, REQUEST_RECEIVED.as_bytes(), Environment::Production)
                    .unwrap();
            assert_eq!(notification.kind(), NotificationKind::RequestReceived, "{status}");
        }
    }

    #[test]
    fn test_interpret_error_body_on_success_status() {
        let err = interpret_response(200, ERROR.as_bytes(), Environment::Production).unwrap_err();
        match err {
            CheckoutError::ApiError { message, environment } => {
                assert_eq!(message, "Bad username and/or password for API Access.");
                assert_eq!(environment, Environment::Production);
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[test]
    fn test_interpret_other_statuses_ignore_body() {
        for status in [100, 301, 302, 304, 500, 503] {
            let err = interpret_response(status, ERROR.as_bytes(), Environment::Sandbox).unwrap_err();
            assert!(matches!(err, CheckoutError::UnexpectedResponse { status: s } if s == status));
        }
    }

    #[test]
    fn test_interpret_unparseable_and_unknown_bodies() {
        let err = interpret_response(200, b"<html><body>", Environment::Sandbox).unwrap_err();
        assert!(matches!(err, CheckoutError::MalformedDocument(_)));

        let err = interpret_response(200, b"<html/>", Environment::Sandbox).unwrap_err();
        assert!(matches!(err, CheckoutError::MalformedDocument(ref m) if m.contains("<html>")));
    }

    #[tokio::test]
    async fn test_submit_posts_command_to_request_endpoint() {
        let transport = MockTransport::replying(200, REQUEST_RECEIVED);
        let client = client(transport.clone());

        let answer = client.submit(&charge()).await.unwrap();
        assert_eq!(answer.kind(), NotificationKind::RequestReceived);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://sandbox.google.com/checkout/cws/v2/Merchant/1234567890/request"
        );
        assert_eq!(requests[0].merchant_id, "1234567890");
        assert_eq!(requests[0].content_type.as_deref(), Some("application/xml;charset=UTF-8"));
        assert_eq!(requests[0].body, charge().to_xml().unwrap());
    }

    #[tokio::test]
    async fn test_submit_api_error() {
        let client = client(MockTransport::replying(200, ERROR));
        let err = client.submit(&charge()).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::ApiError { ref message, environment: Environment::Sandbox }
                if message == "Bad username and/or password for API Access."
        ));
    }

    #[tokio::test]
    async fn test_submit_redirect_status_is_unexpected() {
        let client = client(MockTransport::replying(302, REQUEST_RECEIVED));
        let err = client.submit(&charge()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::UnexpectedResponse { status: 302 }));
    }

    #[tokio::test]
    async fn test_validation_failure_sends_nothing() {
        let transport = MockTransport::replying(200, REQUEST_RECEIVED);
        let client = client(transport.clone());

        let message = SendBuyerMessage::new(credentials(), "841171949013218", "a".repeat(256));
        let err = client.submit(&message).await.unwrap_err();
        assert!(matches!(err, CheckoutError::MessageTooLong { .. }));

        let empty = Cart::new(credentials());
        assert!(matches!(client.submit(&empty).await, Err(CheckoutError::EmptyCart)));

        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_submit_cart_posts_cached_bytes() {
        let transport = MockTransport::replying(200, CHECKOUT_REDIRECT);
        let client = client(transport.clone());

        let mut cart = Cart::new(credentials());
        cart.add_item(LineItem::new("A Quarter", "One shiny quarter.", Decimal::new(25, 2)))
            .unwrap();

        let answer = client.submit(&cart).await.unwrap();
        let redirect = answer.as_checkout_redirect().unwrap();
        assert_eq!(
            redirect.redirect_url().unwrap(),
            "https://checkout.google.com/buy?foo=bar&id=8572098456"
        );
        assert_eq!(transport.requests()[0].body, cart.xml().unwrap());
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let transport = MockTransport::default();
        transport.push(Reply::Fail("connection reset".to_owned()));
        let err = client(transport).submit(&charge()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::TransportError(ref m) if m == "connection reset"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_with_timeout_expires() {
        let transport = MockTransport::default();
        transport.push(Reply::Delay(Duration::from_secs(60)));
        let err = client(transport)
            .submit_with_timeout(&charge(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::TransportError(ref m) if m.contains("timed out")));
    }

    #[tokio::test]
    async fn test_submit_with_timeout_in_time() {
        let client = client(MockTransport::replying(200, REQUEST_RECEIVED));
        let answer = client.submit_with_timeout(&charge(), Duration::from_secs(5)).await.unwrap();
        assert_eq!(answer.kind(), NotificationKind::RequestReceived);
    }

    #[test]
    fn test_from_config() {
        let config = CheckoutConfig::from_toml(
            "environment = \"sandbox\"\n[merchant]\nmerchant_id = \"42\"\nmerchant_key = \"k\"",
        )
        .unwrap();
        let client = CheckoutClient::from_config(&config).unwrap();
        assert_eq!(client.environment(), Environment::Sandbox);
        assert!(format!("{client:?}").contains("CheckoutClient"));
    }
}
