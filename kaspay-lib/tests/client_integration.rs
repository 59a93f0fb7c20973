//! Integration tests for the Kaspay client over real HTTP.
//!
//! A wiremock server plays the Kaspay service: it verifies the request
//! envelope with the shared keys and seals its reply the same way.
//!
//! ```bash
//! cargo test -p kaspay-lib --test client_integration
//! ```

#![cfg(all(feature = "http-transport", feature = "aes-cbc"))]

use std::str::FromStr;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use kaspay_lib::client::{EscrowState, LinkAttempt};
use kaspay_lib::{
    ApiKeys, CallContext, ClientConfig, EnvelopeCodec, KaspayClient, KaspayError,
    KaspayErrorCode, Verb,
};
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_string_contains, header, method, path, query_param},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};

const ACCOUNT: &str = "merchant-1";

/// Service-side responder: opens the request envelope, answers with `reply`.
struct SealingResponder {
    codec: EnvelopeCodec,
    reply: Value,
}

impl SealingResponder {
    fn new(keys: &ApiKeys, reply: Value) -> Self {
        Self {
            codec: EnvelopeCodec::with_default_cipher(keys.clone()).unwrap(),
            reply,
        }
    }
}

fn request_params(request: &Request) -> Vec<(String, String)> {
    if request.method.as_str() == "GET" {
        return request
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
    }
    String::from_utf8_lossy(&request.body)
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| {
            (
                k.to_string(),
                urlencoding::decode(v).unwrap().into_owned(),
            )
        })
        .collect()
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> &'a str {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
        .unwrap_or_default()
}

fn signed_context(request: &Request) -> (CallContext, Vec<u8>) {
    let params = request_params(request);
    let mut url = request.url.clone();
    url.set_query(None);

    let ctx = CallContext::new(
        Verb::from_str(request.method.as_str()).unwrap(),
        url.to_string(),
        param(&params, "uaccount"),
        param(&params, "timestamp").parse().unwrap(),
    );
    let envelope = STANDARD.decode(param(&params, "data")).unwrap();
    (ctx, envelope)
}

impl Respond for SealingResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let (ctx, envelope) = signed_context(request);

        match self.codec.decrypt_request(&ctx, &envelope) {
            Ok(plaintext) => {
                assert!(serde_json::from_slice::<Value>(&plaintext).is_ok());
                let body = serde_json::to_vec(&self.reply).unwrap();
                let sealed = self.codec.encrypt_response(&ctx, 200, &body).unwrap();
                ResponseTemplate::new(200).set_body_json(json!(STANDARD.encode(sealed)))
            }
            Err(err) => ResponseTemplate::new(403).set_body_json(json!({ "error": err.to_string() })),
        }
    }
}

fn client(server: &MockServer, keys: ApiKeys) -> KaspayClient {
    let config = ClientConfig::new(format!("{}/api/v1", server.uri())).with_timeout(5);
    KaspayClient::new(config, ACCOUNT, keys).unwrap()
}

// ============================================================================
// Successful calls
// ============================================================================

#[tokio::test]
async fn test_escrow_hold_over_http() {
    let server = MockServer::start().await;
    let keys = ApiKeys::generate();

    Mock::given(method("POST"))
        .and(path("/api/v1/escrow/hold/TRX-1"))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("uaccount=merchant-1"))
        .respond_with(SealingResponder::new(&keys, json!({ "status": true })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server, keys).escrow().hold("TRX-1").await.unwrap();
    assert!(result.status);
}

#[tokio::test]
async fn test_escrow_status_uses_query_string() {
    let server = MockServer::start().await;
    let keys = ApiKeys::generate();

    Mock::given(method("GET"))
        .and(path("/api/v1/escrow/status/TRX-2"))
        .and(query_param("uaccount", ACCOUNT))
        .respond_with(SealingResponder::new(
            &keys,
            json!({ "status": true, "escrow_status": "Active" }),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let status = client(&server, keys).escrow().status("TRX-2").await.unwrap();
    assert_eq!(status.escrow_status, EscrowState::Active);

    let received = server.received_requests().await.unwrap();
    assert!(received[0].body.is_empty());
}

#[tokio::test]
async fn test_user_link_over_http() {
    let server = MockServer::start().await;
    let keys = ApiKeys::generate();

    Mock::given(method("POST"))
        .and(path("/api/v1/user/link/merchant-1"))
        .respond_with(SealingResponder::new(
            &keys,
            json!({ "id": "LA-7", "confirmation_url": "https://www.kaspay.com/confirm/LA-7" }),
        ))
        .mount(&server)
        .await;

    let attempt: LinkAttempt = client(&server, keys)
        .user()
        .link("merchant-1", "https://shop.test/ok", "https://shop.test/no")
        .await
        .unwrap();
    assert_eq!(attempt.id, "LA-7");
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_wrong_mac_key_is_rejected_by_service() {
    let server = MockServer::start().await;
    let service_keys = ApiKeys::generate();
    let client_keys = ApiKeys::new(
        service_keys.encryption_key().to_vec(),
        b"not the mac key".to_vec(),
    )
    .unwrap();

    Mock::given(method("POST"))
        .respond_with(SealingResponder::new(&service_keys, json!({ "status": true })))
        .mount(&server)
        .await;

    let err = client(&server, client_keys)
        .escrow()
        .release("TRX-3")
        .await
        .unwrap_err();
    match err {
        KaspayError::Api { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "invalid signature");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_error_page() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = client(&server, ApiKeys::generate())
        .payment()
        .execute("PA-1")
        .await
        .unwrap_err();
    assert_eq!(err.code(), KaspayErrorCode::Json);
    assert_eq!(err.http_status(), 500);
}

#[tokio::test]
async fn test_response_sealed_with_other_keys() {
    let server = MockServer::start().await;
    let keys = ApiKeys::generate();

    // Opens the request with the real keys but seals the reply with others.
    let impostor = EnvelopeCodec::with_default_cipher(ApiKeys::generate()).unwrap();
    let honest = EnvelopeCodec::with_default_cipher(keys.clone()).unwrap();
    Mock::given(method("POST"))
        .respond_with(move |request: &Request| {
            let (ctx, envelope) = signed_context(request);
            honest.decrypt_request(&ctx, &envelope).unwrap();
            let sealed = impostor.encrypt_response(&ctx, 200, b"{}").unwrap();
            ResponseTemplate::new(200).set_body_json(json!(STANDARD.encode(sealed)))
        })
        .mount(&server)
        .await;

    let err = client(&server, keys)
        .payment()
        .cancel("PA-9")
        .await
        .unwrap_err();
    assert_eq!(err.code(), KaspayErrorCode::Decryption);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_timeout_maps_to_connection_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = ClientConfig::new(format!("{}/api/v1", server.uri())).with_timeout(1);
    let client = KaspayClient::new(config, ACCOUNT, ApiKeys::generate()).unwrap();

    let err = client.escrow().refund("TRX-4").await.unwrap_err();
    assert!(matches!(err, KaspayError::ConnectionTimeout { timeout_ms: 1000, .. }));
    assert_eq!(err.code(), KaspayErrorCode::Transport);
}

#[tokio::test]
async fn test_connection_refused() {
    // Nothing listens on port 1.
    let config = ClientConfig::new("http://127.0.0.1:1/api/v1").with_timeout(5);
    let client = KaspayClient::new(config, ACCOUNT, ApiKeys::generate()).unwrap();

    let err = client.escrow().hold("TRX-5").await.unwrap_err();
    assert_eq!(err.code(), KaspayErrorCode::Transport);
    assert_eq!(err.http_status(), 0);
    assert!(err.is_retryable());
}
