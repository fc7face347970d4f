//! Endpoint resolution for merchant API URLs.
//!
//! Requests go to `https://{host}/checkout/cws/v2/Merchant/{merchant_id}/{request|checkout}`
//! where the host depends on the [`Environment`].

use url::Url;

use crate::{
    config::{EndpointConfig, Environment},
    error::{CheckoutError, Result},
};

/// Which merchant endpoint a URL is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// Order processing commands and server-to-server cart posts.
    Request,
    /// Browser form submission of a signed cart.
    Checkout,
}

impl EndpointKind {
    const fn path_segment(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Checkout => "checkout",
        }
    }
}

/// Maps a merchant id to endpoint URLs.
pub trait EndpointResolver: Send + Sync {
    /// Environment the resolved URLs belong to, reported in API errors.
    fn environment(&self) -> Environment;

    /// Absolute URL of `kind` for `merchant_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidInput`] if the URL cannot be formed.
    fn resolve(&self, kind: EndpointKind, merchant_id: &str) -> Result<Url>;
}

/// Resolver for the processor's published hosts.
///
/// # Examples
///
/// ```
/// use google_checkout::{
///     config::Environment,
///     endpoint::{DefaultEndpointResolver, EndpointKind, EndpointResolver},
/// };
///
/// let resolver = DefaultEndpointResolver::new(Environment::Sandbox);
/// let url = resolver.resolve(EndpointKind::Request, "1234567890").unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://sandbox.google.com/checkout/cws/v2/Merchant/1234567890/request"
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEndpointResolver {
    environment: Environment,
}

impl DefaultEndpointResolver {
    /// Creates a resolver for `environment`.
    #[must_use]
    pub const fn new(environment: Environment) -> Self {
        Self { environment }
    }
}

impl EndpointResolver for DefaultEndpointResolver {
    fn environment(&self) -> Environment {
        self.environment
    }

    fn resolve(&self, kind: EndpointKind, merchant_id: &str) -> Result<Url> {
        merchant_url(&format!("https://{}/checkout", self.environment.host()), kind, merchant_id)
    }
}

/// Resolver honouring an [`EndpointConfig`] override, falling back to the published hosts.
#[derive(Debug, Clone)]
pub struct ConfigurableEndpointResolver {
    environment: Environment,
    base_url: Option<String>,
}

impl ConfigurableEndpointResolver {
    /// Creates a resolver from configuration.
    #[must_use]
    pub fn new(environment: Environment, config: &EndpointConfig) -> Self {
        Self { environment, base_url: config.base_url.clone() }
    }
}

impl EndpointResolver for ConfigurableEndpointResolver {
    fn environment(&self) -> Environment {
        self.environment
    }

    fn resolve(&self, kind: EndpointKind, merchant_id: &str) -> Result<Url> {
        match &self.base_url {
            Some(base) => merchant_url(base, kind, merchant_id),
            None => DefaultEndpointResolver::new(self.environment).resolve(kind, merchant_id),
        }
    }
}

fn merchant_url(base: &str, kind: EndpointKind, merchant_id: &str) -> Result<Url> {
    if merchant_id.is_empty() || !merchant_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CheckoutError::InvalidInput(format!(
            "merchant id is not usable in a URL path: '{merchant_id}'"
        )));
    }
    let raw = format!(
        "{}/cws/v2/Merchant/{merchant_id}/{}",
        base.trim_end_matches('/'),
        kind.path_segment()
    );
    Url::parse(&raw).map_err(|e| CheckoutError::InvalidInput(format!("invalid endpoint '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_resolver_production() {
        let resolver = DefaultEndpointResolver::default();
        assert_eq!(resolver.environment(), Environment::Production);
        assert_eq!(
            resolver.resolve(EndpointKind::Request, "1234567890").unwrap().as_str(),
            "https://checkout.google.com/checkout/cws/v2/Merchant/1234567890/request"
        );
        assert_eq!(
            resolver.resolve(EndpointKind::Checkout, "1234567890").unwrap().as_str(),
            "https://checkout.google.com/checkout/cws/v2/Merchant/1234567890/checkout"
        );
    }

    #[test]
    fn test_default_resolver_sandbox() {
        let resolver = DefaultEndpointResolver::new(Environment::Sandbox);
        assert_eq!(
            resolver.resolve(EndpointKind::Checkout, "42").unwrap().as_str(),
            "https://sandbox.google.com/checkout/cws/v2/Merchant/42/checkout"
        );
    }

    #[test]
    fn test_rejects_unsafe_merchant_id() {
        let resolver = DefaultEndpointResolver::default();
        for id in ["", "../admin", "12?x=1", "a/b"] {
            let result = resolver.resolve(EndpointKind::Request, id);
            assert!(matches!(result, Err(CheckoutError::InvalidInput(_))), "{id}");
        }
    }

    #[test]
    fn test_configurable_resolver_override() {
        let config =
            EndpointConfig { base_url: Some("https://checkout-proxy.example.com/gc/".to_owned()) };
        let resolver = ConfigurableEndpointResolver::new(Environment::Sandbox, &config);
        assert_eq!(resolver.environment(), Environment::Sandbox);
        assert_eq!(
            resolver.resolve(EndpointKind::Request, "42").unwrap().as_str(),
            "https://checkout-proxy.example.com/gc/cws/v2/Merchant/42/request"
        );
    }

    #[test]
    fn test_configurable_resolver_fallback() {
        let resolver =
            ConfigurableEndpointResolver::new(Environment::Production, &EndpointConfig::default());
        assert_eq!(
            resolver.resolve(EndpointKind::Request, "42").unwrap().as_str(),
            "https://checkout.google.com/checkout/cws/v2/Merchant/42/request"
        );
    }
}
