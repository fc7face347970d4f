//! Settings for the outbound HTTPS connection to the processor.
//!
//! Read from the `[http]` table of [`CheckoutConfig`](crate::config::CheckoutConfig);
//! every key is optional.

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

use crate::error::{CheckoutError, Result};

/// Timeouts, pooling and trust roots for [`HttpTransport`](super::HttpTransport).
///
/// # Examples
///
/// ```toml
/// [http]
/// timeout_secs = 30
/// connect_timeout_secs = 10
/// pool_max_idle_per_host = 10
/// http_version = "auto"
/// trust_bundle = "/etc/ssl/cacert.pem"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Idle connections kept open to the processor host.
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,

    /// Whole-request deadline in seconds, 1 to 300.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// TCP and TLS handshake deadline in seconds, 1 to 60.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Protocol negotiation with the processor.
    #[serde(default)]
    pub http_version: HttpVersion,

    /// PEM file of CA certificates. When set, only these roots are trusted; otherwise the
    /// bundled web PKI roots are used.
    #[serde(default)]
    pub trust_bundle: Option<PathBuf>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: default_pool_max_idle(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            http_version: HttpVersion::Auto,
            trust_bundle: None,
        }
    }
}

impl HttpConfig {
    /// Checks timeouts and the trust bundle path.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::ConfigError`] when `timeout_secs` is outside 1-300,
    /// `connect_timeout_secs` is outside 1-60, or `trust_bundle` is an empty path.
    pub fn validate(&self) -> Result<()> {
        in_range("timeout_secs", self.timeout_secs, MAX_TIMEOUT_SECS)?;
        in_range("connect_timeout_secs", self.connect_timeout_secs, MAX_CONNECT_TIMEOUT_SECS)?;
        if self.trust_bundle.as_ref().is_some_and(|path| path.as_os_str().is_empty()) {
            return Err(CheckoutError::ConfigError("trust_bundle must not be empty".to_owned()));
        }
        Ok(())
    }

    /// Whole-request deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Handshake deadline.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

const MAX_TIMEOUT_SECS: u64 = 300;
const MAX_CONNECT_TIMEOUT_SECS: u64 = 60;

fn in_range(key: &str, secs: u64, max: u64) -> Result<()> {
    if (1..=max).contains(&secs) {
        Ok(())
    } else {
        Err(CheckoutError::ConfigError(format!("{key} must be between 1 and {max}, got {secs}")))
    }
}

/// Protocol negotiation with the processor.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HttpVersion {
    /// Force HTTP/1.1.
    Http1,
    /// HTTP/2 with prior knowledge.
    Http2,
    /// Let ALPN pick during the TLS handshake.
    #[default]
    Auto,
}

const fn default_pool_max_idle() -> usize {
    10
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_connect_timeout_secs() -> u64 {
    10
}
