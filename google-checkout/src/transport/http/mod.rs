//! HTTP transport implementation.
//!
//! HTTP/1.1 and HTTP/2 via reqwest with rustls. Requests carry basic-auth credentials and
//! are only sent over HTTPS; redirects are never followed.

use std::path::Path;

use reqwest::{Certificate, Client, redirect::Policy};
use tracing::instrument;
use url::Url;

use super::config::{HttpConfig, HttpVersion};
use crate::{
    error::{CheckoutError, Result},
    transport::{RequestContext, Transport, TransportResponse, sealed},
};

/// Validates URL for security constraints.
///
/// Ensures the URL uses HTTPS and does not point to localhost.
fn validate_url(url: &Url) -> Result<()> {
    if url.scheme() != "https" {
        return Err(CheckoutError::TransportError("Only HTTPS URLs are allowed".to_owned()));
    }

    if let Some(host) = url.host_str()
        && (host == "localhost" || host == "127.0.0.1" || host == "::1" || host == "[::1]")
    {
        return Err(CheckoutError::TransportError("Localhost URLs are not allowed".to_owned()));
    }

    Ok(())
}

/// Rejects a content type that could split the header block.
fn validate_content_type(value: &str) -> Result<()> {
    if value.contains(['\r', '\n', '\0']) {
        return Err(CheckoutError::TransportError(
            "Invalid content type: control characters not allowed".to_owned(),
        ));
    }
    Ok(())
}

/// Reads every certificate from a PEM bundle.
///
/// Fails closed: an unreadable file, unparsable PEM or a bundle without certificates is an
/// error rather than a fallback to the built-in roots.
fn load_trust_bundle(path: &Path) -> Result<Vec<Certificate>> {
    let pem = std::fs::read(path).map_err(|e| {
        CheckoutError::TransportError(format!("cannot read trust bundle {}: {e}", path.display()))
    })?;
    let certificates = Certificate::from_pem_bundle(&pem).map_err(|e| {
        CheckoutError::TransportError(format!("invalid trust bundle {}: {e}", path.display()))
    })?;
    if certificates.is_empty() {
        return Err(CheckoutError::TransportError(format!(
            "trust bundle {} contains no certificates",
            path.display()
        )));
    }
    Ok(certificates)
}

/// HTTP/1.1 and HTTP/2 transport using reqwest.
///
/// The trust bundle, if configured, is read once here and installed as the only set of
/// roots, so the client is fully initialised before it is shared across tasks.
///
/// # Examples
///
/// ```
/// use google_checkout::transport::{HttpConfig, HttpTransport, HttpVersion};
///
/// let config = HttpConfig {
///     pool_max_idle_per_host: 20,
///     timeout_secs: 60,
///     connect_timeout_secs: 15,
///     http_version: HttpVersion::Http1,
///     trust_bundle: None,
/// };
///
/// let transport = HttpTransport::with_config(&config).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    http_version: HttpVersion,
}

impl sealed::private::Sealed for HttpTransport {}

impl HttpTransport {
    /// Creates a transport with [`HttpConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client creation fails.
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpConfig::default())
    }

    /// Creates HTTP transport with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::TransportError`] if the trust bundle cannot be loaded and
    /// [`CheckoutError::HttpError`] if the client cannot be built.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .https_only(true)
            .redirect(Policy::none());

        builder = match config.http_version {
            HttpVersion::Http1 => builder.http1_only(),
            HttpVersion::Http2 => builder.http2_prior_knowledge(),
            HttpVersion::Auto => builder,
        };

        if let Some(path) = &config.trust_bundle {
            builder = builder.tls_built_in_root_certs(false);
            for certificate in load_trust_bundle(path)? {
                builder = builder.add_root_certificate(certificate);
            }
        }

        let client = builder.build().map_err(CheckoutError::HttpError)?;

        Ok(Self { client, http_version: config.http_version })
    }

    #[instrument(
        skip(self, ctx, body),
        fields(url = %ctx.url, body_len = body.len(), status = tracing::field::Empty)
    )]
    async fn execute_post(&self, ctx: RequestContext<'_>, body: &[u8]) -> Result<TransportResponse> {
        validate_url(ctx.url)?;

        let mut request = self.client.post(ctx.url.clone()).basic_auth(
            ctx.credentials.merchant_id(),
            Some(ctx.credentials.merchant_key().expose_secret()),
        );

        if let Some(content_type) = ctx.content_type {
            validate_content_type(content_type)?;
            request = request.header("Content-Type", content_type).header("Accept", content_type);
        }

        let response = request.body(body.to_vec()).send().await?;

        let status = response.status().as_u16();
        tracing::Span::current().record("status", status);

        let response_body = response.bytes().await.map_err(CheckoutError::HttpError)?.to_vec();

        Ok(TransportResponse { status, body: response_body })
    }
}

impl Transport for HttpTransport {
    async fn post<'a>(&'a self, ctx: RequestContext<'a>, body: &'a [u8]) -> Result<TransportResponse> {
        self.execute_post(ctx, body).await
    }

    fn protocol_name(&self) -> &'static str {
        match self.http_version {
            HttpVersion::Http1 => "http/1.1",
            HttpVersion::Http2 => "http/2",
            HttpVersion::Auto => "http",
        }
    }
}
