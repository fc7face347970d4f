//! HMAC-SHA1 signatures over built documents.
//!
//! The processor authenticates a posted cart by recomputing HMAC-SHA1 over the
//! exact cart bytes with the merchant key. The signature must therefore be taken
//! over the bytes that are transmitted, never over a re-serialization.
//!
//! # Examples
//!
//! ```
//! use google_checkout::signer::HmacSigner;
//!
//! let signer = HmacSigner::new(b"merchant-key");
//! let signature = signer.sign(b"<checkout-shopping-cart/>").unwrap();
//! assert_eq!(signature.len(), 20);
//! assert!(signer.verify(b"<checkout-shopping-cart/>", &signature));
//! ```

use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use zeroize::Zeroizing;

use crate::error::{CheckoutError, Result};

type HmacSha1 = Hmac<Sha1>;

/// Length of an HMAC-SHA1 digest in bytes.
pub const SIGNATURE_LEN: usize = 20;

/// Computes HMAC-SHA1 of `document` keyed by `secret_key`.
///
/// # Errors
///
/// Returns [`CheckoutError::CryptoError`] if the MAC cannot be initialised.
pub fn sign(secret_key: &[u8], document: &[u8]) -> Result<[u8; SIGNATURE_LEN]> {
    let mut mac = HmacSha1::new_from_slice(secret_key)
        .map_err(|e| CheckoutError::CryptoError(format!("HMAC key rejected: {e}")))?;
    mac.update(document);
    let mut digest = [0u8; SIGNATURE_LEN];
    digest.copy_from_slice(&mac.finalize().into_bytes());
    Ok(digest)
}

/// Signer bound to one merchant key.
///
/// The key copy is wiped from memory when the signer is dropped.
pub struct HmacSigner {
    key: Zeroizing<Vec<u8>>,
}

impl HmacSigner {
    /// Creates a signer for `key`.
    #[must_use]
    pub fn new(key: &[u8]) -> Self {
        Self { key: Zeroizing::new(key.to_vec()) }
    }

    /// Raw 20-byte digest of `document`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::CryptoError`] if the MAC cannot be initialised.
    pub fn sign(&self, document: &[u8]) -> Result<[u8; SIGNATURE_LEN]> {
        sign(&self.key, document)
    }

    /// Base64 (standard alphabet, padded) digest of `document`, as posted in checkout forms.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::CryptoError`] if the MAC cannot be initialised.
    pub fn sign_base64(&self, document: &[u8]) -> Result<String> {
        Ok(STANDARD.encode(self.sign(document)?))
    }

    /// Checks `signature` against `document` in constant time.
    #[must_use]
    pub fn verify(&self, document: &[u8], signature: &[u8]) -> bool {
        HmacSha1::new_from_slice(&self.key)
            .map(|mut mac| {
                mac.update(document);
                mac.verify_slice(signature).is_ok()
            })
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSigner").field("key", &"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_known_vector() {
        // RFC 2202 test case 2.
        let digest = sign(b"Jefe", b"what do ya want for nothing?").unwrap();
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        assert_eq!(hex, "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79");
    }

    #[test]
    fn test_sign_base64_length() {
        let signer = HmacSigner::new(b"key");
        let encoded = signer.sign_base64(b"document").unwrap();
        assert_eq!(encoded.len(), 28);
        assert_eq!(STANDARD.decode(&encoded).unwrap(), signer.sign(b"document").unwrap());
    }

    #[test]
    fn test_empty_key_and_document() {
        let signer = HmacSigner::new(b"");
        assert!(signer.sign(b"").is_ok());
    }

    #[test]
    fn test_verify_rejects_tampered_and_truncated() {
        let signer = HmacSigner::new(b"secret");
        let signature = signer.sign(b"payload").unwrap();
        assert!(signer.verify(b"payload", &signature));
        assert!(!signer.verify(b"payloaD", &signature));
        assert!(!signer.verify(b"payload", &signature[..10]));
        assert!(!HmacSigner::new(b"other").verify(b"payload", &signature));
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", HmacSigner::new(b"super-secret"));
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }

    proptest! {
        #[test]
        fn prop_signing_is_deterministic(
            key in prop::collection::vec(any::<u8>(), 0..64),
            doc in prop::collection::vec(any::<u8>(), 0..512),
        ) {
            let signer = HmacSigner::new(&key);
            prop_assert_eq!(signer.sign(&doc).unwrap(), signer.sign(&doc).unwrap());
        }

        #[test]
        fn prop_single_byte_change_changes_digest(
            key in prop::collection::vec(any::<u8>(), 1..64),
            doc in prop::collection::vec(any::<u8>(), 1..512),
            index in any::<prop::sample::Index>(),
            flip in 1u8..=255,
        ) {
            let signer = HmacSigner::new(&key);
            let mut tampered = doc.clone();
            let i = index.index(tampered.len());
            tampered[i] ^= flip;
            prop_assert_ne!(signer.sign(&doc).unwrap(), signer.sign(&tampered).unwrap());
            prop_assert!(!signer.verify(&tampered, &signer.sign(&doc).unwrap()));
        }
    }
}
