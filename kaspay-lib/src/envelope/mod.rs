//! Encrypt-then-MAC request/response envelopes.
//!
//! # Wire Format
//!
//! ```text
//! [16 bytes IV][M bytes AES-256-CBC ciphertext][32 bytes HMAC-SHA256]
//! ```
//!
//! The MAC covers `verb&url&uaccount&timestamp&` followed by the IV and
//! ciphertext, keyed with the MAC key. There is no length prefix: the last
//! 32 bytes are the signature and everything before them is ciphertext.
//!
//! # Verification order
//!
//! [`EnvelopeCodec::decrypt_request`] always runs the decryption, then always
//! recomputes and compares the MAC, and only then decides. A bad signature is
//! reported before a failed decryption. Both failures cost the same work, so
//! response latency does not tell a forged envelope from a corrupted one.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::cipher::{Cipher, CipherError};
use crate::keys::ApiKeys;
use crate::params::{CallContext, CallParameters};

/// HMAC-SHA256 output length.
pub const SIGNATURE_SIZE: usize = 32;

/// HTTP status whose bodies are enveloped. Every other status passes through.
pub const STATUS_OK: u16 = 200;

/// Smallest well-formed envelope: IV, one cipher block, signature.
pub const MIN_ENVELOPE_SIZE: usize =
    crate::cipher::IV_SIZE + crate::cipher::BLOCK_SIZE + SIGNATURE_SIZE;

type HmacSha256 = Hmac<Sha256>;

/// Envelope failures. None of them carry plaintext.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("decryption failed")]
    FailedDecryption,
    #[error("encryption failed: {0}")]
    Encryption(#[from] CipherError),
    #[error("MAC key rejected")]
    InvalidKey,
}

/// Result type for envelope operations.
pub type EnvelopeResult<T> = Result<T, EnvelopeError>;

/// Seals and opens envelopes for one merchant's keys.
///
/// Holds no per-call state. The cipher is injected once and shared by every
/// call, so a codec is cheap to clone and safe to use from many tasks.
///
/// # Example
///
/// ```
/// # #[cfg(feature = "aes-cbc")] {
/// use kaspay_lib::envelope::EnvelopeCodec;
/// use kaspay_lib::keys::ApiKeys;
/// use kaspay_lib::params::{CallContext, Verb};
///
/// let codec = EnvelopeCodec::with_default_cipher(ApiKeys::generate()).unwrap();
/// let ctx = CallContext::new(Verb::Get, "https://www.kaspay.com/api/v1/escrow/status/T1", "m01", 1_700_000_000);
///
/// let envelope = codec.encrypt_request(&ctx, b"[]").unwrap();
/// assert_eq!(codec.decrypt_request(&ctx, &envelope).unwrap(), b"[]");
/// # }
/// ```
#[derive(Clone)]
pub struct EnvelopeCodec {
    keys: ApiKeys,
    cipher: Arc<dyn Cipher>,
}

impl EnvelopeCodec {
    /// Create a codec with an explicit cipher.
    pub fn new(keys: ApiKeys, cipher: Arc<dyn Cipher>) -> Self {
        Self { keys, cipher }
    }

    /// Create a codec with the cipher compiled into this build.
    pub fn with_default_cipher(keys: ApiKeys) -> crate::Result<Self> {
        Ok(Self::new(keys, crate::cipher::default_cipher()?))
    }

    /// The keys this codec signs and encrypts with.
    pub fn keys(&self) -> &ApiKeys {
        &self.keys
    }

    /// HMAC-SHA256 of the canonical signing string for `ciphertext`.
    pub fn sign(&self, ctx: &CallContext, ciphertext: &[u8]) -> EnvelopeResult<[u8; SIGNATURE_SIZE]> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.keys.mac_key())
            .map_err(|_| EnvelopeError::InvalidKey)?;
        mac.update(&ctx.signing_input(ciphertext));
        Ok(mac.finalize().into_bytes().into())
    }

    /// Constant-time check of `signature` against the MAC of `ciphertext`.
    fn verify(&self, ctx: &CallContext, ciphertext: &[u8], signature: &[u8]) -> bool {
        match self.sign(ctx, ciphertext) {
            Ok(expected) => signatures_match(&expected, signature),
            Err(_) => false,
        }
    }

    /// Encrypt `plaintext` and append its signature.
    pub fn encrypt_request(&self, ctx: &CallContext, plaintext: &[u8]) -> EnvelopeResult<Vec<u8>> {
        let mut envelope = self.cipher.encrypt(self.keys.encryption_key(), plaintext)?;
        let signature = self.sign(ctx, &envelope)?;
        envelope.extend_from_slice(&signature);
        Ok(envelope)
    }

    /// Verify and decrypt an envelope sealed under `ctx`.
    pub fn decrypt_request(&self, ctx: &CallContext, envelope: &[u8]) -> EnvelopeResult<Vec<u8>> {
        let (ciphertext, signature) = split_envelope(envelope);

        // Both steps run unconditionally; see the module docs.
        let decrypted = self.cipher.decrypt(self.keys.encryption_key(), ciphertext);
        let is_valid = self.verify(ctx, ciphertext, signature);

        if !is_valid {
            Err(EnvelopeError::InvalidSignature)
        } else {
            decrypted.map_err(|_| EnvelopeError::FailedDecryption)
        }
    }

    /// Seal a full set of call parameters.
    pub fn seal(&self, params: &CallParameters) -> EnvelopeResult<Vec<u8>> {
        self.encrypt_request(params.context(), params.data())
    }

    /// Seal a response body when `status` is 200, otherwise return it as is.
    pub fn encrypt_response(
        &self,
        ctx: &CallContext,
        status: u16,
        plaintext: &[u8],
    ) -> EnvelopeResult<Vec<u8>> {
        if status == STATUS_OK {
            self.encrypt_request(ctx, plaintext)
        } else {
            Ok(plaintext.to_vec())
        }
    }

    /// Open a response body when `status` is 200, otherwise return it as is.
    pub fn decrypt_response(
        &self,
        ctx: &CallContext,
        status: u16,
        body: &[u8],
    ) -> EnvelopeResult<Vec<u8>> {
        if status == STATUS_OK {
            self.decrypt_request(ctx, body)
        } else {
            Ok(body.to_vec())
        }
    }
}

impl std::fmt::Debug for EnvelopeCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeCodec")
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

/// Split `ciphertext || signature` by position only.
///
/// Inputs shorter than a signature yield an empty ciphertext and the whole
/// input as the (necessarily wrong-length) signature.
pub fn split_envelope(envelope: &[u8]) -> (&[u8], &[u8]) {
    envelope.split_at(envelope.len().saturating_sub(SIGNATURE_SIZE))
}

/// Envelope length for a plaintext of `len` bytes.
pub fn envelope_len(len: usize) -> usize {
    crate::cipher::ciphertext_len(len) + SIGNATURE_SIZE
}

/// Constant-time signature comparison.
///
/// Examines every byte regardless of where the first difference is. A length
/// mismatch is rejected without comparing contents.
pub fn signatures_match(expected: &[u8], received: &[u8]) -> bool {
    expected.ct_eq(received).into()
}
