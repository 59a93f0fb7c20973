use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::params::Verb;
use crate::Result;

/// Form/query parameter carrying the merchant identifier.
pub const PARAM_UACCOUNT: &str = "uaccount";
/// Form/query parameter carrying the UNIX timestamp.
pub const PARAM_TIMESTAMP: &str = "timestamp";
/// Form/query parameter carrying the base64 envelope.
pub const PARAM_DATA: &str = "data";

/// The three named fields sent with every call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParams {
    pub uaccount: String,
    pub timestamp: i64,
    /// Standard base64 of `ciphertext || signature`.
    pub data: String,
}

impl RequestParams {
    /// Parameters as ordered name/value pairs for form or query encoding.
    pub fn as_pairs(&self) -> [(&'static str, String); 3] {
        [
            (PARAM_UACCOUNT, self.uaccount.clone()),
            (PARAM_TIMESTAMP, self.timestamp.to_string()),
            (PARAM_DATA, self.data.clone()),
        ]
    }
}

/// One outgoing API call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportRequest {
    pub verb: Verb,
    pub url: String,
    pub params: RequestParams,
}

/// Raw HTTP-level result. Any status is a successful transport outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Moves one request to the Kaspay API and returns the raw response.
///
/// Implementations enforce their own timeout and report connection, TLS and
/// timeout failures as `Err` with a transport-class [`KaspayError`](crate::KaspayError).
/// Non-200 statuses are not errors at this layer.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}
