//! Kaspay API client library.
//!
//! Every call to the Kaspay API carries its payload in an encrypt-then-MAC
//! envelope: AES-256-CBC ciphertext followed by an HMAC-SHA256 signature that
//! binds the ciphertext to the HTTP verb, the URL, the merchant account and
//! the timestamp. Successful responses come back sealed the same way.
//!
//! # Features
//!
//! - **Envelope codec**: [`EnvelopeCodec`] seals and opens request and
//!   response bodies, independent of any network code
//! - **Transport abstraction**: [`HttpTransport`] with a reqwest
//!   implementation behind the `http-transport` feature
//! - **Resource clients**: escrow, payment and user endpoints on
//!   [`KaspayClient`]
//!
//! # Example
//!
//! ```
//! # #[cfg(feature = "aes-cbc")]
//! # fn main() -> kaspay_lib::Result<()> {
//! use kaspay_lib::{ApiKeys, CallContext, EnvelopeCodec, Verb};
//!
//! let keys = ApiKeys::generate();
//! let codec = EnvelopeCodec::with_default_cipher(keys)?;
//!
//! let ctx = CallContext::new(
//!     Verb::Post,
//!     "https://www.kaspay.com/api/v1/escrow/hold/TRX-1",
//!     "merchant-1",
//!     1_700_000_000,
//! );
//! let envelope = codec.encrypt_request(&ctx, b"[]")?;
//! assert_eq!(codec.decrypt_request(&ctx, &envelope)?, b"[]");
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "aes-cbc"))]
//! # fn main() {}
//! ```

pub mod cipher;
pub mod client;
pub mod envelope;
pub mod errors;
pub mod keys;
pub mod params;
pub mod prelude;
pub mod transport;

/// Test doubles for the cipher, the transport and the remote service.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use cipher::{Cipher, CipherError, KeyPolicy};
pub use client::{ApiResponse, ClientConfig, KaspayClient, TlsVerification};
pub use envelope::{EnvelopeCodec, EnvelopeError};
pub use errors::{KaspayError, KaspayErrorCode};
pub use keys::ApiKeys;
pub use params::{CallContext, CallParameters, Verb};
pub use transport::{HttpTransport, TransportRequest, TransportResponse};

#[cfg(feature = "http-transport")]
pub use transport::ReqwestTransport;

/// Common result alias for Kaspay operations.
pub type Result<T> = std::result::Result<T, KaspayError>;
