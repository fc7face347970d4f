//! Merchant identity used for Basic authentication and cart signing.

use std::fmt;

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CheckoutError, Result};

/// Secret merchant key.
///
/// Never printed by `Debug` and wiped from memory on drop.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct MerchantKey(String);

impl MerchantKey {
    /// Wraps a key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key material. Only pass this to authentication or signing code.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for MerchantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MerchantKey([REDACTED])")
    }
}

/// Merchant id and key pair issued by the processor.
///
/// # Examples
///
/// ```
/// use google_checkout::credentials::MerchantCredentials;
///
/// let credentials = MerchantCredentials::new("1234567890", "HsYXFoZfHAqyLcCRYeH8qQ");
/// assert!(credentials.validate().is_ok());
/// assert!(!format!("{credentials:?}").contains("HsYXFoZfHAqyLcCRYeH8qQ"));
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct MerchantCredentials {
    merchant_id: String,
    merchant_key: MerchantKey,
}

impl MerchantCredentials {
    /// Creates credentials from an id and key.
    #[must_use]
    pub fn new(merchant_id: impl Into<String>, merchant_key: impl Into<String>) -> Self {
        Self { merchant_id: merchant_id.into(), merchant_key: MerchantKey::new(merchant_key) }
    }

    /// Merchant id, as used in endpoint paths and button URLs.
    #[must_use]
    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    /// Merchant key.
    #[must_use]
    pub const fn merchant_key(&self) -> &MerchantKey {
        &self.merchant_key
    }

    /// Checks that both parts are present and the id is safe to embed in a URL path.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::MissingRequiredField`] for an empty id or key,
    /// [`CheckoutError::InvalidInput`] if the id contains anything but ASCII letters and digits.
    pub fn validate(&self) -> Result<()> {
        if self.merchant_id.is_empty() {
            return Err(CheckoutError::MissingRequiredField("merchant_id".to_owned()));
        }
        if !self.merchant_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CheckoutError::InvalidInput(format!(
                "merchant_id must be ASCII letters and digits: {}",
                self.merchant_id
            )));
        }
        if self.merchant_key.expose_secret().is_empty() {
            return Err(CheckoutError::MissingRequiredField("merchant_key".to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ok() {
        assert!(MerchantCredentials::new("1234567890", "key").validate().is_ok());
    }

    #[test]
    fn test_validate_empty_parts() {
        let err = MerchantCredentials::new("", "key").validate().unwrap_err();
        assert!(matches!(err, CheckoutError::MissingRequiredField(ref f) if f == "merchant_id"));

        let err = MerchantCredentials::new("123", "").validate().unwrap_err();
        assert!(matches!(err, CheckoutError::MissingRequiredField(ref f) if f == "merchant_key"));
    }

    #[test]
    fn test_validate_rejects_path_characters() {
        for id in ["12/34", "../1", "12 34", "１２"] {
            let err = MerchantCredentials::new(id, "key").validate().unwrap_err();
            assert!(matches!(err, CheckoutError::InvalidInput(_)), "{id}");
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        let credentials = MerchantCredentials::new("1234567890", "top-secret-key");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("1234567890"));
        assert!(!debug.contains("top-secret-key"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_deserialize() {
        let credentials: MerchantCredentials =
            toml::from_str("merchant_id = \"42\"\nmerchant_key = \"k\"").unwrap();
        assert_eq!(credentials.merchant_id(), "42");
        assert_eq!(credentials.merchant_key().expose_secret(), "k");
    }
}
