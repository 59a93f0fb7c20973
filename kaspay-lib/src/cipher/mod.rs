//! Symmetric cipher capability used by the envelope codec.
//!
//! The Kaspay wire format fixes the algorithm to AES-256-CBC with PKCS#7
//! padding and a random 16-byte IV prepended to the ciphertext:
//!
//! ```text
//! [16 bytes IV][M bytes AES-256-CBC ciphertext, M a multiple of 16]
//! ```
//!
//! The backend is chosen when the crate is built (`aes-cbc` feature), not at
//! runtime. [`default_cipher`] reports [`KaspayError::UnsupportedCipherEnvironment`]
//! when no backend was compiled in.

#[cfg(feature = "aes-cbc")]
mod aes_cbc;

#[cfg(feature = "aes-cbc")]
pub use aes_cbc::Aes256CbcCipher;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::Result;

/// Key length in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// AES block length in bytes.
pub const BLOCK_SIZE: usize = 16;

/// IV length in bytes, prepended to every ciphertext.
pub const IV_SIZE: usize = 16;

/// Cipher error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CipherError {
    #[error("key must be {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
    #[error("ciphertext is {0} bytes, expected IV plus whole blocks")]
    MalformedCiphertext(usize),
    #[error("decryption failed: bad padding")]
    BadPadding,
}

/// Result type for cipher operations.
pub type CipherResult<T> = std::result::Result<T, CipherError>;

/// How externally supplied keys are fitted to [`KEY_SIZE`].
///
/// `Fit` right-pads short keys with zero bytes and truncates long ones. The
/// deployed service does the same, so `Fit` is required for byte-level
/// interoperability. It also means a 10-byte key only carries 10 bytes of
/// entropy. `Strict` refuses anything but an exact 32-byte key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPolicy {
    /// Zero-pad or truncate to 32 bytes.
    #[default]
    Fit,
    /// Reject keys that are not exactly 32 bytes.
    Strict,
}

impl KeyPolicy {
    /// Normalize `key` to exactly [`KEY_SIZE`] bytes under this policy.
    pub fn apply(&self, key: &[u8]) -> CipherResult<Zeroizing<[u8; KEY_SIZE]>> {
        let mut fitted = Zeroizing::new([0u8; KEY_SIZE]);
        match self {
            Self::Fit => {
                let n = key.len().min(KEY_SIZE);
                fitted[..n].copy_from_slice(&key[..n]);
            }
            Self::Strict => {
                if key.len() != KEY_SIZE {
                    return Err(CipherError::InvalidKeyLength {
                        expected: KEY_SIZE,
                        actual: key.len(),
                    });
                }
                fitted.copy_from_slice(key);
            }
        }
        Ok(fitted)
    }
}

/// Symmetric encryption contract consumed by the envelope codec.
///
/// Implementations must be stateless per call: every encryption draws a
/// fresh IV, so one instance can be shared across threads.
pub trait Cipher: Send + Sync {
    /// Encrypt `plaintext`, returning `iv || ciphertext`.
    fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> CipherResult<Vec<u8>>;

    /// Decrypt an `iv || ciphertext` blob.
    ///
    /// Must return an error rather than panic on malformed input or a wrong
    /// key: the codec calls this before it knows whether the envelope is
    /// authentic.
    fn decrypt(&self, key: &[u8], ciphertext: &[u8]) -> CipherResult<Vec<u8>>;

    /// Generate a random 256-bit key suitable for encryption or MAC use.
    fn generate_key(&self) -> [u8; KEY_SIZE] {
        generate_key()
    }
}

/// Generate a random 256-bit key.
pub fn generate_key() -> [u8; KEY_SIZE] {
    let mut key = [0u8; KEY_SIZE];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut key);
    key
}

/// Length of the cipher output for a plaintext of `len` bytes.
pub fn ciphertext_len(len: usize) -> usize {
    IV_SIZE + (len / BLOCK_SIZE + 1) * BLOCK_SIZE
}

/// The cipher compiled into this build, using the compatible key policy.
#[cfg(feature = "aes-cbc")]
pub fn default_cipher() -> Result<Arc<dyn Cipher>> {
    Ok(Arc::new(Aes256CbcCipher::new()))
}

/// The cipher compiled into this build (none without the `aes-cbc` feature).
#[cfg(not(feature = "aes-cbc"))]
pub fn default_cipher() -> Result<Arc<dyn Cipher>> {
    Err(crate::KaspayError::UnsupportedCipherEnvironment)
}

/// The compiled-in cipher with an explicit key policy.
#[cfg(feature = "aes-cbc")]
pub fn cipher_with_policy(policy: KeyPolicy) -> Result<Arc<dyn Cipher>> {
    Ok(Arc::new(Aes256CbcCipher::with_policy(policy)))
}

/// The compiled-in cipher with an explicit key policy (none without `aes-cbc`).
#[cfg(not(feature = "aes-cbc"))]
pub fn cipher_with_policy(_policy: KeyPolicy) -> Result<Arc<dyn Cipher>> {
    Err(crate::KaspayError::UnsupportedCipherEnvironment)
}
