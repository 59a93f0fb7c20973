//! Linking Kaspay users to a merchant.

use serde::{Deserialize, Deserializer, Serialize};

use super::{path_segment, KaspayClient, EMPTY_BODY};
use crate::params::Verb;
use crate::Result;

const URL_LINK: &str = "user/link";
const URL_UNLINK: &str = "user/unlink";

/// A pending link request awaiting user approval.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAttempt {
    /// Attempt identifier.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Page the user must be redirected to for approval.
    pub confirmation_url: String,
}

/// Confirmation of a removed link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unlinked {
    pub uaccount: String,
    pub message: String,
}

#[derive(Serialize)]
struct LinkRequest<'a> {
    approve_url: &'a str,
    reject_url: &'a str,
}

/// User endpoints, borrowed from a [`KaspayClient`].
#[derive(Clone, Copy, Debug)]
pub struct UserApi<'a> {
    client: &'a KaspayClient,
}

impl<'a> UserApi<'a> {
    pub(crate) fn new(client: &'a KaspayClient) -> Self {
        Self { client }
    }

    /// Start linking a user to `merchant_uaccount`.
    ///
    /// Kaspay redirects the user to `approve_url` or `reject_url` once they
    /// decide.
    pub async fn link(
        &self,
        merchant_uaccount: &str,
        approve_url: &str,
        reject_url: &str,
    ) -> Result<LinkAttempt> {
        let merchant = path_segment("merchant_uaccount", merchant_uaccount)?;
        let url = self.client.url(&format!("{}/{}", URL_LINK, merchant));
        let body = serde_json::to_vec(&LinkRequest {
            approve_url,
            reject_url,
        })?;
        self.client
            .send_request(Verb::Post, &url, &body)
            .await?
            .json()
    }

    /// Remove the link between `uaccount` and `merchant_uaccount`.
    pub async fn unlink(&self, uaccount: &str, merchant_uaccount: &str) -> Result<Unlinked> {
        let uaccount = path_segment("uaccount", uaccount)?;
        let merchant = path_segment("merchant_uaccount", merchant_uaccount)?;
        let url = self
            .client
            .url(&format!("{}/{}/{}", URL_UNLINK, uaccount, merchant));
        self.client
            .send_request(Verb::Post, &url, EMPTY_BODY)
            .await?
            .json()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

#[cfg(all(test, feature = "aes-cbc"))]
mod tests {
    use super::*;
    use crate::client::tests::{answering, keys};
    use crate::test_utils::MockServerSide;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_link() {
        let (client, transport) = answering(json!({
            "id": 981,
            "confirmation_url": "https://www.kaspay.com/user/confirm/981"
        }));

        let attempt = client
            .user()
            .link(
                "merchant-1",
                "https://shop.test/kaspay/approved",
                "https://shop.test/kaspay/rejected",
            )
            .await
            .unwrap();
        assert_eq!(attempt.id, "981");
        assert_eq!(
            attempt.confirmation_url,
            "https://www.kaspay.com/user/confirm/981"
        );

        let request = transport.last_request().unwrap();
        assert_eq!(request.verb, Verb::Post);
        assert_eq!(request.url, "http://kaspay.test/api/v1/user/link/merchant-1");

        let server = MockServerSide::new(keys()).unwrap();
        let sent: Value = serde_json::from_slice(&server.open_request(&request).unwrap()).unwrap();
        assert_eq!(
            sent,
            json!({
                "approve_url": "https://shop.test/kaspay/approved",
                "reject_url": "https://shop.test/kaspay/rejected"
            })
        );
    }

    #[tokio::test]
    async fn test_unlink() {
        let (client, transport) = answering(json!({
            "uaccount": "user-5",
            "message": "User unlinked"
        }));

        let unlinked = client.user().unlink("user-5", "merchant-1").await.unwrap();
        assert_eq!(
            unlinked,
            Unlinked {
                uaccount: "user-5".to_string(),
                message: "User unlinked".to_string(),
            }
        );

        let request = transport.last_request().unwrap();
        assert_eq!(
            request.url,
            "http://kaspay.test/api/v1/user/unlink/user-5/merchant-1"
        );
        let server = MockServerSide::new(keys()).unwrap();
        assert_eq!(server.open_request(&request).unwrap(), b"[]");
    }

    #[test]
    fn test_link_attempt_accepts_string_id() {
        let attempt: LinkAttempt =
            serde_json::from_value(json!({ "id": "LA-1", "confirmation_url": "u" })).unwrap();
        assert_eq!(attempt.id, "LA-1");
    }
}
