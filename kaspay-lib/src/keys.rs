//! Encryption and MAC key material.

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::cipher::{self, KEY_SIZE};
use crate::{KaspayError, Result};

/// The pair of independent keys issued to a merchant account.
///
/// Keys are kept exactly as supplied; fitting to 32 bytes happens inside the
/// cipher according to its [`KeyPolicy`](crate::cipher::KeyPolicy). Both
/// buffers are wiped on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ApiKeys {
    encryption: Vec<u8>,
    mac: Vec<u8>,
}

impl ApiKeys {
    /// Build from raw key bytes.
    pub fn new(encryption: impl Into<Vec<u8>>, mac: impl Into<Vec<u8>>) -> Result<Self> {
        let keys = Self {
            encryption: encryption.into(),
            mac: mac.into(),
        };
        if keys.encryption.is_empty() {
            return Err(KaspayError::InvalidKey(
                "encryption key cannot be empty".to_string(),
            ));
        }
        if keys.mac.is_empty() {
            return Err(KaspayError::InvalidKey("MAC key cannot be empty".to_string()));
        }
        Ok(keys)
    }

    /// Build from standard base64, the form in which keys are issued.
    pub fn from_base64(encryption_b64: &str, mac_b64: &str) -> Result<Self> {
        let encryption = BASE64
            .decode(encryption_b64.trim())
            .map_err(|e| KaspayError::InvalidKey(format!("encryption key: {}", e)))?;
        let mac = BASE64
            .decode(mac_b64.trim())
            .map_err(|e| KaspayError::InvalidKey(format!("MAC key: {}", e)))?;
        Self::new(encryption, mac)
    }

    /// Generate a fresh random key pair.
    pub fn generate() -> Self {
        Self {
            encryption: cipher::generate_key().to_vec(),
            mac: cipher::generate_key().to_vec(),
        }
    }

    /// Encryption key bytes.
    pub fn encryption_key(&self) -> &[u8] {
        &self.encryption
    }

    /// MAC key bytes.
    pub fn mac_key(&self) -> &[u8] {
        &self.mac
    }

    /// Encryption key as standard base64.
    pub fn encryption_key_base64(&self) -> String {
        BASE64.encode(&self.encryption)
    }

    /// MAC key as standard base64.
    pub fn mac_key_base64(&self) -> String {
        BASE64.encode(&self.mac)
    }

    /// True when both keys are exactly 32 bytes and no fitting is applied.
    pub fn is_exact_length(&self) -> bool {
        self.encryption.len() == KEY_SIZE && self.mac.len() == KEY_SIZE
    }
}

impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeys")
            .field("encryption", &format_args!("<{} bytes>", self.encryption.len()))
            .field("mac", &format_args!("<{} bytes>", self.mac.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_base64() {
        let enc = BASE64.encode([1u8; 32]);
        let mac = BASE64.encode([2u8; 32]);
        let keys = ApiKeys::from_base64(&enc, &mac).unwrap();

        assert_eq!(keys.encryption_key(), &[1u8; 32]);
        assert_eq!(keys.mac_key(), &[2u8; 32]);
        assert!(keys.is_exact_length());
        assert_eq!(keys.encryption_key_base64(), enc);
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let err = ApiKeys::from_base64("not base64!!", "AAAA").unwrap_err();
        assert!(matches!(err, KaspayError::InvalidKey(_)));
    }

    #[test]
    fn test_empty_keys_rejected() {
        assert!(ApiKeys::new(Vec::new(), vec![1u8]).is_err());
        assert!(ApiKeys::new(vec![1u8], Vec::new()).is_err());
    }

    #[test]
    fn test_short_keys_are_kept_verbatim() {
        let keys = ApiKeys::new(vec![3u8; 10], vec![4u8; 64]).unwrap();
        assert_eq!(keys.encryption_key().len(), 10);
        assert_eq!(keys.mac_key().len(), 64);
        assert!(!keys.is_exact_length());
    }

    #[test]
    fn test_debug_redacts_material() {
        let keys = ApiKeys::new(vec![0xAAu8; 32], vec![0xBBu8; 32]).unwrap();
        let printed = format!("{:?}", keys);
        assert!(printed.contains("32 bytes"));
        assert!(!printed.contains("170"));
        assert!(!printed.contains("AA"));
    }

    #[test]
    fn test_generate() {
        let keys = ApiKeys::generate();
        assert!(keys.is_exact_length());
        assert_ne!(keys.encryption_key(), keys.mac_key());
    }
}
