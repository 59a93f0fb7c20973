//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;

use super::traits::{HttpTransport, TransportRequest, TransportResponse};
use crate::client::{ClientConfig, TlsVerification};
use crate::params::Verb;
use crate::{KaspayError, Result};

/// HTTP transport for the Kaspay API.
///
/// GET calls carry the parameters in the query string; POST, PUT and DELETE
/// send them as an `application/x-www-form-urlencoded` body. Every request
/// asks for `application/json`.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl ReqwestTransport {
    /// Build a transport honoring the timeout and TLS settings of `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs));

        match &config.tls {
            TlsVerification::SystemRoots => {}
            TlsVerification::Certificate { path } => {
                let pem = std::fs::read(path).map_err(|e| {
                    KaspayError::Configuration(format!(
                        "cannot read CA certificate {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                    KaspayError::Configuration(format!(
                        "invalid CA certificate {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                builder = builder
                    .tls_built_in_root_certs(false)
                    .add_root_certificate(cert);
            }
            TlsVerification::Disabled => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        let client = builder.build().map_err(|e| {
            KaspayError::Configuration(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    /// Map reqwest errors to KaspayError.
    fn map_reqwest_error(&self, request: &TransportRequest, e: reqwest::Error) -> KaspayError {
        if e.is_timeout() {
            KaspayError::ConnectionTimeout {
                operation: format!("{} {}", request.verb, request.url),
                timeout_ms: self.timeout_secs * 1000,
            }
        } else if e.is_connect() {
            KaspayError::ConnectionFailed {
                target: request.url.clone(),
                reason: e.to_string(),
            }
        } else {
            KaspayError::Transport(format!("Kaspay request failed: {}", e))
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl HttpTransport for ReqwestTransport {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, request), fields(verb = %request.verb, url = %request.url)))]
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let pairs = request.params.as_pairs();

        let builder = match request.verb {
            Verb::Get => self.client.get(&request.url).query(&pairs),
            Verb::Post => self.client.post(&request.url).form(&pairs),
            Verb::Put => self.client.put(&request.url).form(&pairs),
            Verb::Delete => self.client.delete(&request.url).form(&pairs),
        };

        let response = builder
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(&request, e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_reqwest_error(&request, e))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(status, body_len = body.len(), "kaspay response received");

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Self-signed P-256 CA for `kaspay.test`.
    const TEST_CA_PEM: &str = "\
-----BEGIN CERTIFICATE-----
MIIBhDCCASmgAwIBAgIUOI338ieccO9fmXs0ThI8T6e4DMAwCgYIKoZIzj0EAwIw
FjEUMBIGA1UEAwwLa2FzcGF5LnRlc3QwIBcNMjYxMDE3MTg1MjI5WhgPMjEyNjA5
MjMxODUyMjlaMBYxFDASBgNVBAMMC2thc3BheS50ZXN0MFkwEwYHKoZIzj0CAQYI
KoZIzj0DAQcDQgAE7tTE2SqUEN7u+uspxjZBwHy9xGGZxVozRYNkwPucnD6a2zAw
a+JiYaRvlmsCdC3UwRZV/5ma0H2aVz8K6AQxpKNTMFEwHQYDVR0OBBYEFDah8oKJ
nUa/oc+bPTvlZ3iw3Z8lMB8GA1UdIwQYMBaAFDah8oKJnUa/oc+bPTvlZ3iw3Z8l
MA8GA1UdEwEB/wQFMAMBAf8wCgYIKoZIzj0EAwIDSQAwRgIhAP0jp3kcPipOAfT0
9uZUntiwbY9zcUVFSqrHRjlyfQcvAiEAuJaOA4OYgk8Z7dI8b834JuLrII/4u3hO
bCA/hi8JP3o=
-----END CERTIFICATE-----
";

    fn pem_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_transport_creation() {
        let transport = ReqwestTransport::new(&ClientConfig::production()).unwrap();
        assert_eq!(transport.timeout_secs, 30);
    }

    #[test]
    fn test_insecure_transport_creation() {
        let config = ClientConfig::development().without_tls_verification();
        assert!(ReqwestTransport::new(&config).is_ok());
    }

    #[test]
    fn test_missing_certificate_is_configuration_error() {
        let config = ClientConfig::production().with_certificate("/nonexistent/Kaspay.com.crt");
        let err = ReqwestTransport::new(&config).unwrap_err();
        assert!(matches!(err, KaspayError::Configuration(_)));
    }

    #[test]
    fn test_pinned_certificate_transport_creation() {
        let file = pem_file(TEST_CA_PEM);
        let config = ClientConfig::production().with_certificate(file.path());
        assert!(ReqwestTransport::new(&config).is_ok());
    }

    #[test]
    fn test_garbage_certificate_is_configuration_error() {
        let file = pem_file("-----BEGIN CERTIFICATE-----\nnot a certificate\n-----END CERTIFICATE-----\n");
        let config = ClientConfig::production().with_certificate(file.path());
        let err = ReqwestTransport::new(&config).unwrap_err();
        assert!(matches!(err, KaspayError::Configuration(_)));
    }
}
