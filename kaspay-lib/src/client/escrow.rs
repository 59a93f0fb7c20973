//! Escrow operations on a merchant transaction.

use serde::{Deserialize, Serialize};

use super::{path_segment, KaspayClient, EMPTY_BODY};
use crate::params::Verb;
use crate::Result;

const URL_HOLD: &str = "escrow/hold";
const URL_RELEASE: &str = "escrow/release";
const URL_REFUND: &str = "escrow/refund";
const URL_STATUS: &str = "escrow/status";

/// Lifecycle state of an escrow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EscrowState {
    Active,
    Suspended,
    Released,
    Refunded,
}

impl std::fmt::Display for EscrowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Active => "Active",
            Self::Suspended => "Suspended",
            Self::Released => "Released",
            Self::Refunded => "Refunded",
        };
        f.write_str(name)
    }
}

/// Result of hold, release and refund.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationStatus {
    pub status: bool,
}

/// Result of an escrow status query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowStatus {
    pub status: bool,
    pub escrow_status: EscrowState,
}

/// Escrow endpoints, borrowed from a [`KaspayClient`].
#[derive(Clone, Copy, Debug)]
pub struct EscrowApi<'a> {
    client: &'a KaspayClient,
}

impl<'a> EscrowApi<'a> {
    pub(crate) fn new(client: &'a KaspayClient) -> Self {
        Self { client }
    }

    /// Put transaction `trxid` on hold.
    pub async fn hold(&self, trxid: &str) -> Result<OperationStatus> {
        self.operation(URL_HOLD, trxid).await
    }

    /// Release the funds held for `trxid`.
    pub async fn release(&self, trxid: &str) -> Result<OperationStatus> {
        self.operation(URL_RELEASE, trxid).await
    }

    /// Refund the funds held for `trxid`.
    pub async fn refund(&self, trxid: &str) -> Result<OperationStatus> {
        self.operation(URL_REFUND, trxid).await
    }

    /// Query the escrow state of `trxid`.
    pub async fn status(&self, trxid: &str) -> Result<EscrowStatus> {
        let url = self.endpoint(URL_STATUS, trxid)?;
        self.client
            .send_request(Verb::Get, &url, EMPTY_BODY)
            .await?
            .json()
    }

    async fn operation(&self, path: &str, trxid: &str) -> Result<OperationStatus> {
        let url = self.endpoint(path, trxid)?;
        self.client
            .send_request(Verb::Post, &url, EMPTY_BODY)
            .await?
            .json()
    }

    fn endpoint(&self, path: &str, trxid: &str) -> Result<String> {
        let trxid = path_segment("trxid", trxid)?;
        Ok(self.client.url(&format!("{}/{}", path, trxid)))
    }
}
