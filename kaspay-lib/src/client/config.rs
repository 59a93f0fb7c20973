//! Client configuration.
//!
//! # Environment Variables
//!
//! [`ClientConfig::from_env`] starts from the production preset and applies:
//!
//! - `KASPAY_ENV` - `production` (default) or `development`
//! - `KASPAY_BASE_URL` - explicit API base URL, overrides `KASPAY_ENV`
//! - `KASPAY_TIMEOUT_SECS` - request timeout in seconds
//! - `KASPAY_CA_CERT` - path to the only PEM CA certificate to trust
//! - `KASPAY_INSECURE` - `1`/`true` disables TLS certificate verification

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cipher::KeyPolicy;
use crate::{KaspayError, Result};

/// Production API base URL.
pub const BASE_URL: &str = "https://www.kaspay.com/api/v1/";

/// Development API base URL.
pub const DEV_BASE_URL: &str = "http://kaspay17.dnsd.me/kaspay17/api/v1/";

fn default_timeout() -> u64 {
    30
}

/// How the transport verifies the server certificate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TlsVerification {
    /// Verify against the platform's trusted roots.
    #[default]
    SystemRoots,
    /// Trust only the PEM certificate at `path`; platform roots are ignored.
    Certificate { path: PathBuf },
    /// Do not verify certificates. Development only.
    Disabled,
}

/// Configuration shared by every resource client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API base URL. Builders normalize it to end in a single `/`.
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Server certificate verification.
    #[serde(default)]
    pub tls: TlsVerification,

    /// How keys that are not 32 bytes are handled.
    #[serde(default)]
    pub key_policy: KeyPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl ClientConfig {
    /// Create a configuration for a custom base URL.
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.as_ref()),
            timeout_secs: default_timeout(),
            tls: TlsVerification::default(),
            key_policy: KeyPolicy::default(),
        }
    }

    /// Production preset.
    pub fn production() -> Self {
        Self::new(BASE_URL)
    }

    /// Development preset.
    pub fn development() -> Self {
        Self::new(DEV_BASE_URL)
    }

    /// Load from `KASPAY_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup("KASPAY_ENV").as_deref() {
            None | Some("production") | Some("prod") => Self::production(),
            Some("development") | Some("dev") => Self::development(),
            Some(other) => {
                return Err(KaspayError::Configuration(format!(
                    "unknown KASPAY_ENV '{}'",
                    other
                )))
            }
        };

        if let Some(url) = lookup("KASPAY_BASE_URL").filter(|u| !u.is_empty()) {
            config = config.with_base_url(url);
        }
        if let Some(secs) = lookup("KASPAY_TIMEOUT_SECS") {
            let secs = secs.parse::<u64>().map_err(|e| {
                KaspayError::Configuration(format!("KASPAY_TIMEOUT_SECS: {}", e))
            })?;
            config = config.with_timeout(secs);
        }
        if let Some(path) = lookup("KASPAY_CA_CERT").filter(|p| !p.is_empty()) {
            config = config.with_certificate(path);
        }
        if matches!(
            lookup("KASPAY_INSECURE").as_deref(),
            Some("1") | Some("true") | Some("yes")
        ) {
            config = config.without_tls_verification();
        }

        config.validate()?;
        Ok(config)
    }

    /// Replace the base URL.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = normalize_base_url(base_url.as_ref());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Trust only the PEM certificate at `path`.
    pub fn with_certificate(mut self, path: impl Into<PathBuf>) -> Self {
        self.tls = TlsVerification::Certificate { path: path.into() };
        self
    }

    /// Skip certificate verification.
    pub fn without_tls_verification(mut self) -> Self {
        self.tls = TlsVerification::Disabled;
        self
    }

    /// Set the key policy.
    pub fn with_key_policy(mut self, policy: KeyPolicy) -> Self {
        self.key_policy = policy;
        self
    }

    /// Full URL for a path relative to the base URL.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Reject configurations that cannot work.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(KaspayError::Configuration(format!(
                "base URL must be http(s), got '{}'",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(KaspayError::Configuration(
                "timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

fn normalize_base_url(url: &str) -> String {
    format!("{}/", url.trim().trim_end_matches('/'))
}
