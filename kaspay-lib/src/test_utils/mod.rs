//! Test utilities for Kaspay.
//!
//! - [`CountingCipher`] wraps a real cipher and counts calls
//! - [`MockTransport`] replays scripted responses and records requests
//! - [`MockServerSide`] opens request envelopes and seals responses the way
//!   the Kaspay service does
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kaspay_lib::test_utils::{MockServerSide, MockTransport};
//!
//! let server = MockServerSide::new(keys.clone())?;
//! let transport = MockTransport::responding(move |request| {
//!     server.respond(request, 200, &serde_json::json!({ "status": true }))
//! });
//! let client = KaspayClient::with_transport(config, "merchant-1", keys, Arc::new(transport))?;
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::cipher::{Cipher, CipherResult};
use crate::envelope::{EnvelopeCodec, STATUS_OK};
use crate::keys::ApiKeys;
use crate::params::CallContext;
use crate::transport::{HttpTransport, TransportRequest, TransportResponse};
use crate::{KaspayError, Result};

/// Cipher double that delegates to `inner` and counts calls.
#[derive(Debug, Default)]
pub struct CountingCipher<C> {
    inner: C,
    encrypts: AtomicUsize,
    decrypts: AtomicUsize,
}

impl<C> CountingCipher<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            encrypts: AtomicUsize::new(0),
            decrypts: AtomicUsize::new(0),
        }
    }

    pub fn encrypt_calls(&self) -> usize {
        self.encrypts.load(Ordering::SeqCst)
    }

    pub fn decrypt_calls(&self) -> usize {
        self.decrypts.load(Ordering::SeqCst)
    }
}

impl<C: Cipher> Cipher for CountingCipher<C> {
    fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> CipherResult<Vec<u8>> {
        self.encrypts.fetch_add(1, Ordering::SeqCst);
        self.inner.encrypt(key, plaintext)
    }

    fn decrypt(&self, key: &[u8], ciphertext: &[u8]) -> CipherResult<Vec<u8>> {
        self.decrypts.fetch_add(1, Ordering::SeqCst);
        self.inner.decrypt(key, ciphertext)
    }
}

type Responder = Box<dyn Fn(&TransportRequest) -> Result<TransportResponse> + Send + Sync>;

/// In-memory [`HttpTransport`].
///
/// Scripted responses are returned first, in order. Once the script is
/// exhausted the responder (if any) answers; otherwise the call fails with a
/// transport error.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Result<TransportResponse>>>,
    responder: Option<Responder>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request with `responder`.
    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&TransportRequest) -> Result<TransportResponse> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(responder)),
            ..Self::default()
        }
    }

    /// Queue a raw response.
    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.lock_script()
            .push_back(Ok(TransportResponse::new(status, body)));
    }

    /// Queue a transport failure.
    pub fn push_error(&self, error: KaspayError) {
        self.lock_script().push_back(Err(error));
    }

    /// Every request sent so far.
    pub fn requests(&self) -> Vec<TransportRequest> {
        match self.requests.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last_request(&self) -> Option<TransportRequest> {
        self.requests().pop()
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<TransportResponse>>> {
        match self.script.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("scripted", &self.lock_script().len())
            .field("has_responder", &self.responder.is_some())
            .finish()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl HttpTransport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        match self.requests.lock() {
            Ok(mut guard) => guard.push(request.clone()),
            Err(poisoned) => poisoned.into_inner().push(request.clone()),
        }

        if let Some(scripted) = self.lock_script().pop_front() {
            return scripted;
        }
        match &self.responder {
            Some(responder) => responder(&request),
            None => Err(KaspayError::Transport(
                "mock transport has no response scripted".to_string(),
            )),
        }
    }
}

/// The remote half of the protocol, sharing keys with the client.
#[derive(Clone, Debug)]
pub struct MockServerSide {
    codec: EnvelopeCodec,
}

impl MockServerSide {
    /// Server side using the compiled-in cipher.
    pub fn new(keys: ApiKeys) -> Result<Self> {
        Ok(Self {
            codec: EnvelopeCodec::with_default_cipher(keys)?,
        })
    }

    pub fn with_codec(codec: EnvelopeCodec) -> Self {
        Self { codec }
    }

    /// Call context the client must have signed `request` under.
    pub fn context(request: &TransportRequest) -> CallContext {
        CallContext::new(
            request.verb,
            request.url.clone(),
            request.params.uaccount.clone(),
            request.params.timestamp,
        )
    }

    /// Verify and decrypt the request's `data` field.
    pub fn open_request(&self, request: &TransportRequest) -> Result<Vec<u8>> {
        let envelope = STANDARD
            .decode(&request.params.data)
            .map_err(|e| KaspayError::invalid_data("data", e.to_string()))?;
        Ok(self
            .codec
            .decrypt_request(&Self::context(request), &envelope)?)
    }

    /// Build the HTTP response the service would send for `body`.
    ///
    /// A 200 body is sealed under the request's context and sent as a JSON
    /// string of base64; anything else is sent as plain JSON.
    pub fn respond(
        &self,
        request: &TransportRequest,
        status: u16,
        body: &serde_json::Value,
    ) -> Result<TransportResponse> {
        self.respond_bytes(request, status, &serde_json::to_vec(body)?)
    }

    /// [`respond`](Self::respond) with an arbitrary plaintext body.
    pub fn respond_bytes(
        &self,
        request: &TransportRequest,
        status: u16,
        plaintext: &[u8],
    ) -> Result<TransportResponse> {
        if status != STATUS_OK {
            return Ok(TransportResponse::new(
                status,
                String::from_utf8_lossy(plaintext),
            ));
        }
        let sealed = self
            .codec
            .encrypt_response(&Self::context(request), status, plaintext)?;
        let wire = serde_json::to_string(&STANDARD.encode(sealed))?;
        Ok(TransportResponse::new(status, wire))
    }
}
