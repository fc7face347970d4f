//! Client configuration loaded from TOML.
//!
//! # Examples
//!
//! ```
//! use google_checkout::config::{CheckoutConfig, Environment};
//!
//! let config = CheckoutConfig::from_toml(
//!     r#"
//!     environment = "sandbox"
//!
//!     [merchant]
//!     merchant_id = "1234567890"
//!     merchant_key = "HsYXFoZfHAqyLcCRYeH8qQ"
//!
//!     [http]
//!     timeout_secs = 20
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.environment, Environment::Sandbox);
//! assert_eq!(config.http.timeout_secs, 20);
//! ```

use std::{fmt, path::Path};

use serde::Deserialize;
use url::Url;

use crate::{
    credentials::MerchantCredentials,
    error::{CheckoutError, Result},
    transport::HttpConfig,
};

/// Processor environment a client talks to.
///
/// Selects endpoint hosts and button image hosts. Passed explicitly to every component
/// that needs it rather than held in global state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Test environment at `sandbox.google.com`.
    Sandbox,
    /// Live environment at `checkout.google.com`.
    #[default]
    Production,
}

impl Environment {
    /// Host serving API endpoints and button images.
    #[must_use]
    pub const fn host(self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox.google.com",
            Self::Production => "checkout.google.com",
        }
    }

    /// `true` for [`Environment::Sandbox`].
    #[must_use]
    pub const fn is_sandbox(self) -> bool {
        matches!(self, Self::Sandbox)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        })
    }
}

/// Optional endpoint override.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointConfig {
    /// Replaces `https://{host}/checkout`; merchant paths are appended to it.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl EndpointConfig {
    /// Validates the override, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::ConfigError`] if `base_url` is not an absolute HTTPS URL.
    pub fn validate(&self) -> Result<()> {
        let Some(base_url) = &self.base_url else {
            return Ok(());
        };
        let url = Url::parse(base_url)
            .map_err(|e| CheckoutError::ConfigError(format!("invalid base_url '{base_url}': {e}")))?;
        if url.scheme() != "https" {
            return Err(CheckoutError::ConfigError(format!(
                "base_url must use HTTPS, got: {}",
                url.scheme()
            )));
        }
        if url.host_str().is_none() {
            return Err(CheckoutError::ConfigError(format!("base_url has no host: {base_url}")));
        }
        Ok(())
    }
}

/// Complete client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutConfig {
    /// Target environment; production unless set.
    #[serde(default)]
    pub environment: Environment,
    /// Merchant credentials.
    pub merchant: MerchantCredentials,
    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,
    /// Endpoint override.
    #[serde(default)]
    pub endpoints: EndpointConfig,
}

impl CheckoutConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::ConfigError`] if the TOML is invalid or a value fails
    /// validation.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| CheckoutError::ConfigError(format!("failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::ConfigError`] if the file cannot be read, or as
    /// [`from_toml`](Self::from_toml).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CheckoutError::ConfigError(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&contents)
    }

    /// Checks credentials, HTTP bounds and endpoint override.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::ConfigError`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.merchant
            .validate()
            .map_err(|e| CheckoutError::ConfigError(format!("merchant: {e}")))?;
        self.http.validate()?;
        self.endpoints.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [merchant]
        merchant_id = "1234567890"
        merchant_key = "secret"
    "#;

    #[test]
    fn test_environment_default_is_production() {
        assert_eq!(Environment::default(), Environment::Production);
    }

    #[test]
    fn test_environment_hosts() {
        assert_eq!(Environment::Sandbox.host(), "sandbox.google.com");
        assert_eq!(Environment::Production.host(), "checkout.google.com");
        assert!(Environment::Sandbox.is_sandbox());
        assert!(!Environment::Production.is_sandbox());
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(Environment::Sandbox.to_string(), "sandbox");
        assert_eq!(Environment::Production.to_string(), "production");
    }

    #[test]
    fn test_from_toml_minimal_uses_defaults() {
        let config = CheckoutConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.merchant.merchant_id(), "1234567890");
        assert_eq!(config.http.timeout_secs, 30);
        assert!(config.http.trust_bundle.is_none());
        assert!(config.endpoints.base_url.is_none());
    }

    #[test]
    fn test_from_toml_full() {
        let config = CheckoutConfig::from_toml(
            r#"
            environment = "sandbox"

            [merchant]
            merchant_id = "1234567890"
            merchant_key = "secret"

            [http]
            timeout_secs = 45
            connect_timeout_secs = 5
            http_version = "http1"
            trust_bundle = "/etc/ssl/cacert.pem"

            [endpoints]
            base_url = "https://sandbox.google.com/checkout"
            "#,
        )
        .unwrap();
        assert_eq!(config.environment, Environment::Sandbox);
        assert_eq!(config.http.timeout_secs, 45);
        assert_eq!(
            config.http.trust_bundle.as_deref(),
            Some(Path::new("/etc/ssl/cacert.pem"))
        );
        assert_eq!(config.endpoints.base_url.as_deref(), Some("https://sandbox.google.com/checkout"));
    }

    #[test]
    fn test_from_toml_missing_merchant() {
        let result = CheckoutConfig::from_toml("environment = \"sandbox\"");
        assert!(matches!(result, Err(CheckoutError::ConfigError(_))));
    }

    #[test]
    fn test_from_toml_unknown_environment() {
        let result = CheckoutConfig::from_toml(&format!("environment = \"staging\"\n{MINIMAL}"));
        assert!(matches!(result, Err(CheckoutError::ConfigError(_))));
    }

    #[test]
    fn test_from_toml_invalid_merchant_id() {
        let result = CheckoutConfig::from_toml(
            "[merchant]\nmerchant_id = \"12/34\"\nmerchant_key = \"k\"",
        );
        assert!(matches!(result, Err(CheckoutError::ConfigError(ref m)) if m.contains("merchant")));
    }

    #[test]
    fn test_from_toml_rejects_http_base_url() {
        let result = CheckoutConfig::from_toml(&format!(
            "{MINIMAL}\n[endpoints]\nbase_url = \"http://sandbox.google.com/checkout\""
        ));
        assert!(matches!(result, Err(CheckoutError::ConfigError(_))));
    }

    #[test]
    fn test_from_toml_rejects_out_of_range_timeout() {
        let result = CheckoutConfig::from_toml(&format!("{MINIMAL}\n[http]\ntimeout_secs = 0"));
        assert!(matches!(result, Err(CheckoutError::ConfigError(_))));
    }

    #[test]
    fn test_from_file_missing() {
        let result = CheckoutConfig::from_file("/nonexistent/checkout.toml");
        assert!(matches!(result, Err(CheckoutError::ConfigError(_))));
    }
}
