//! Authenticated Kaspay API client.
//!
//! [`KaspayClient`] seals every call with the envelope codec, ships it through
//! an [`HttpTransport`], and opens the response. The resource views
//! ([`EscrowApi`], [`PaymentApi`], [`UserApi`]) only build URLs and bodies.
//!
//! # Example
//!
//! ```rust,ignore
//! use kaspay_lib::{ApiKeys, ClientConfig, KaspayClient};
//!
//! let keys = ApiKeys::from_base64(&enc_b64, &mac_b64)?;
//! let client = KaspayClient::new(ClientConfig::production(), "merchant-1", keys)?;
//!
//! let status = client.escrow().status("TRX-42").await?;
//! println!("escrow is {:?}", status.escrow_status);
//! ```

mod config;
mod escrow;
mod payment;
mod user;

pub use config::{ClientConfig, TlsVerification, BASE_URL, DEV_BASE_URL};
pub use escrow::{EscrowApi, EscrowState, EscrowStatus, OperationStatus};
pub use payment::PaymentApi;
pub use user::{LinkAttempt, UserApi, Unlinked};

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cipher::{cipher_with_policy, KeyPolicy};
use crate::envelope::{EnvelopeCodec, STATUS_OK};
use crate::keys::ApiKeys;
use crate::params::{CallContext, Verb};
use crate::transport::{HttpTransport, RequestParams, TransportRequest, TransportResponse};
use crate::{KaspayError, Result};

/// Field of a non-200 response body holding the server's message.
pub const KEY_ERROR_MESSAGE: &str = "error";

/// Plaintext body sent by calls that carry no payload (an empty JSON array).
pub(crate) const EMPTY_BODY: &[u8] = b"[]";

/// A successfully opened API response.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    /// Always 200 for a successful response.
    pub http_status: u16,
    /// Decrypted body parsed as JSON.
    pub body: Value,
    /// Decrypted body bytes.
    pub raw: Vec<u8>,
}

impl ApiResponse {
    /// Deserialize the body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.body.clone()).map_err(|e| KaspayError::InvalidJson {
            status: self.http_status,
            reason: e.to_string(),
        })
    }
}

/// Kaspay API client for one merchant account.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct KaspayClient {
    config: ClientConfig,
    account: String,
    codec: EnvelopeCodec,
    transport: Arc<dyn HttpTransport>,
}

impl KaspayClient {
    /// Create a client that talks HTTP through reqwest.
    #[cfg(feature = "http-transport")]
    pub fn new(config: ClientConfig, account: impl Into<String>, keys: ApiKeys) -> Result<Self> {
        let transport = crate::transport::ReqwestTransport::new(&config)?;
        Self::with_transport(config, account, keys, Arc::new(transport))
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(
        config: ClientConfig,
        account: impl Into<String>,
        keys: ApiKeys,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        config.validate()?;

        let account = account.into();
        if account.is_empty() {
            return Err(KaspayError::invalid_data("uaccount", "must not be empty"));
        }

        if config.key_policy == KeyPolicy::Strict {
            config.key_policy.apply(keys.encryption_key())?;
        }
        let cipher = cipher_with_policy(config.key_policy)?;

        Ok(Self {
            config,
            account,
            codec: EnvelopeCodec::new(keys, cipher),
            transport,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Merchant identifier sent as `uaccount`.
    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn codec(&self) -> &EnvelopeCodec {
        &self.codec
    }

    /// Full URL for a path relative to the configured base URL.
    pub fn url(&self, path: &str) -> String {
        self.config.url(path)
    }

    pub fn escrow(&self) -> EscrowApi<'_> {
        EscrowApi::new(self)
    }

    pub fn payment(&self) -> PaymentApi<'_> {
        PaymentApi::new(self)
    }

    pub fn user(&self) -> UserApi<'_> {
        UserApi::new(self)
    }

    /// Seal `data` for `verb url`, send it, and open the response.
    pub async fn send_request(&self, verb: Verb, url: &str, data: &[u8]) -> Result<ApiResponse> {
        let timestamp = chrono::Utc::now().timestamp();
        self.send_request_at(verb, url, data, timestamp).await
    }

    /// [`send_request`](Self::send_request) with an explicit UNIX timestamp.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, data), fields(account = %self.account, data_len = data.len())))]
    pub async fn send_request_at(
        &self,
        verb: Verb,
        url: &str,
        data: &[u8],
        timestamp: i64,
    ) -> Result<ApiResponse> {
        let ctx = CallContext::new(verb, url, self.account.as_str(), timestamp);
        let envelope = self.codec.encrypt_request(&ctx, data)?;

        let request = TransportRequest {
            verb,
            url: url.to_string(),
            params: RequestParams {
                uaccount: self.account.clone(),
                timestamp,
                data: STANDARD.encode(&envelope),
            },
        };

        let response = self.transport.send(request).await?;
        let result = self.process_response(&ctx, response);

        #[cfg(feature = "tracing")]
        if let Err(err) = &result {
            tracing::warn!(code = ?err.code(), http_status = err.http_status(), "kaspay call failed: {}", err);
        }

        result
    }

    /// Interpret a raw response to a call made under `ctx`.
    ///
    /// Checks run in order: the body must be JSON, a non-200 status is an API
    /// error carrying the body's `error` field, and a 200 body must be a JSON
    /// string of base64 whose envelope opens to JSON.
    pub fn process_response(
        &self,
        ctx: &CallContext,
        response: TransportResponse,
    ) -> Result<ApiResponse> {
        let status = response.status;

        let parsed: Value =
            serde_json::from_str(&response.body).map_err(|e| KaspayError::InvalidJson {
                status,
                reason: e.to_string(),
            })?;

        if status != STATUS_OK {
            let message = match parsed.get(KEY_ERROR_MESSAGE) {
                Some(Value::String(message)) => message.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            return Err(KaspayError::Api { status, message });
        }

        let encoded = parsed.as_str().ok_or_else(|| {
            KaspayError::MalformedEnvelope("expected a base64 JSON string".to_string())
        })?;
        let envelope = STANDARD
            .decode(encoded.trim())
            .map_err(|e| KaspayError::MalformedEnvelope(e.to_string()))?;

        let raw = self.codec.decrypt_response(ctx, status, &envelope)?;
        let body = serde_json::from_slice(&raw).map_err(|e| KaspayError::InvalidJson {
            status,
            reason: e.to_string(),
        })?;

        Ok(ApiResponse {
            http_status: status,
            body,
            raw,
        })
    }
}

impl std::fmt::Debug for KaspayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KaspayClient")
            .field("config", &self.config)
            .field("account", &self.account)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

/// Reject identifiers that would produce a different endpoint path.
pub(crate) fn path_segment<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(KaspayError::invalid_data(field, "must not be empty"));
    }
    if value.contains('/') {
        return Err(KaspayError::invalid_data(field, "must not contain '/'"));
    }
    Ok(value)
}
