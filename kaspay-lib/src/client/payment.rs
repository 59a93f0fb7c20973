//! Payment attempts.

use serde::Serialize;

use super::{path_segment, ApiResponse, KaspayClient, EMPTY_BODY};
use crate::params::Verb;
use crate::Result;

const URL_CREATE: &str = "payment/create";
const URL_EXECUTE: &str = "payment/execute";
const URL_REFUND: &str = "payment/refund";
const URL_CANCEL: &str = "payment/cancel";

/// Payment endpoints, borrowed from a [`KaspayClient`].
///
/// Responses are returned untyped; use [`ApiResponse::json`] to extract them.
#[derive(Clone, Copy, Debug)]
pub struct PaymentApi<'a> {
    client: &'a KaspayClient,
}

impl<'a> PaymentApi<'a> {
    pub(crate) fn new(client: &'a KaspayClient) -> Self {
        Self { client }
    }

    /// Create a payment attempt from any JSON-serializable description.
    pub async fn create<T: Serialize + ?Sized>(&self, attempt: &T) -> Result<ApiResponse> {
        let body = serde_json::to_vec(attempt)?;
        self.client
            .send_request(Verb::Post, &self.client.url(URL_CREATE), &body)
            .await
    }

    pub async fn execute(&self, attempt_id: &str) -> Result<ApiResponse> {
        self.operation(URL_EXECUTE, attempt_id).await
    }

    pub async fn refund(&self, attempt_id: &str) -> Result<ApiResponse> {
        self.operation(URL_REFUND, attempt_id).await
    }

    pub async fn cancel(&self, attempt_id: &str) -> Result<ApiResponse> {
        self.operation(URL_CANCEL, attempt_id).await
    }

    async fn operation(&self, path: &str, attempt_id: &str) -> Result<ApiResponse> {
        let attempt_id = path_segment("payment_attempt_id", attempt_id)?;
        let url = self.client.url(&format!("{}/{}", path, attempt_id));
        self.client.send_request(Verb::Post, &url, EMPTY_BODY).await
    }
}
