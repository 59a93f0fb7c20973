//! CLI command implementations

pub mod envelope;
pub mod escrow;
pub mod keygen;
pub mod payment;
pub mod user;

use anyhow::{Context, Result};
use kaspay_lib::client::DEV_BASE_URL;
use kaspay_lib::{ApiKeys, ClientConfig, EnvelopeCodec, KaspayClient, KeyPolicy};

use crate::{ui, ConnectionArgs};

/// Merchant account from `--uaccount` / `KASPAY_UACCOUNT`.
pub fn account(conn: &ConnectionArgs) -> Result<&str> {
    conn.uaccount
        .as_deref()
        .filter(|a| !a.is_empty())
        .context("No merchant account. Pass --uaccount or set KASPAY_UACCOUNT.")
}

/// API keys from the command line or environment.
pub fn keys(conn: &ConnectionArgs) -> Result<ApiKeys> {
    let enc = conn
        .enc_key
        .as_deref()
        .context("No encryption key. Pass --enc-key or set KASPAY_ENC_KEY.")?;
    let mac = conn
        .mac_key
        .as_deref()
        .context("No MAC key. Pass --mac-key or set KASPAY_MAC_KEY.")?;

    let keys = if conn.raw_keys {
        ApiKeys::new(enc.as_bytes(), mac.as_bytes())?
    } else {
        ApiKeys::from_base64(enc, mac).context("Keys are not valid base64 (use --raw-keys?)")?
    };

    if !keys.is_exact_length() {
        tracing::debug!("key length is not 32 bytes");
    }
    Ok(keys)
}

/// Client configuration: environment first, then command-line overrides.
pub fn config(conn: &ConnectionArgs) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("Invalid KASPAY_* environment")?;

    if conn.dev {
        config = config.with_base_url(DEV_BASE_URL);
    }
    if let Some(url) = &conn.base_url {
        config = config.with_base_url(url);
    }
    if let Some(secs) = conn.timeout {
        config = config.with_timeout(secs);
    }
    if let Some(path) = &conn.ca_cert {
        config = config.with_certificate(path);
    }
    if conn.insecure {
        ui::warning("TLS certificate verification is disabled");
        config = config.without_tls_verification();
    }
    if conn.strict_keys {
        config = config.with_key_policy(KeyPolicy::Strict);
    }

    config.validate()?;
    Ok(config)
}

/// Codec for offline envelope work.
pub fn codec(conn: &ConnectionArgs) -> Result<EnvelopeCodec> {
    let keys = keys(conn)?;
    let policy = if conn.strict_keys {
        KeyPolicy::Strict
    } else {
        KeyPolicy::Fit
    };
    Ok(EnvelopeCodec::new(
        keys,
        kaspay_lib::cipher::cipher_with_policy(policy)?,
    ))
}

/// Connected API client.
pub fn client(conn: &ConnectionArgs) -> Result<KaspayClient> {
    let config = config(conn)?;
    tracing::debug!(base_url = %config.base_url, timeout_secs = config.timeout_secs, "using Kaspay endpoint");
    Ok(KaspayClient::new(config, account(conn)?, keys(conn)?)?)
}
