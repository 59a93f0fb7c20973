//! Envelope commands - seal and open envelopes without touching the network

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use kaspay_lib::envelope::{split_envelope, SIGNATURE_SIZE};
use kaspay_lib::{CallContext, KaspayError, Verb};

use crate::{ui, ConnectionArgs};

fn context(conn: &ConnectionArgs, verb: &str, url: &str, timestamp: i64) -> Result<CallContext> {
    let verb: Verb = verb.parse()?;
    Ok(CallContext::new(verb, url, super::account(conn)?, timestamp))
}

/// Encrypt and sign `data`, printing the request parameters.
pub fn seal(
    conn: &ConnectionArgs,
    verb: &str,
    url: &str,
    data: &str,
    timestamp: Option<i64>,
) -> Result<()> {
    let timestamp = timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp());
    let ctx = context(conn, verb, url, timestamp)?;
    let codec = super::codec(conn)?;

    let envelope = codec
        .encrypt_request(&ctx, data.as_bytes())
        .map_err(KaspayError::from)?;
    let (_, signature) = split_envelope(&envelope);
    tracing::debug!(envelope_len = envelope.len(), "sealed envelope");

    ui::header("Request Parameters");
    ui::key_value("uaccount", ctx.account());
    ui::key_value("timestamp", &timestamp.to_string());
    ui::key_value("data", &STANDARD.encode(&envelope));
    ui::key_value("signature", &STANDARD.encode(signature));

    Ok(())
}

/// Verify and decrypt a base64 envelope, printing the plaintext.
pub fn open(conn: &ConnectionArgs, verb: &str, url: &str, timestamp: i64, data: &str) -> Result<()> {
    let ctx = context(conn, verb, url, timestamp)?;
    let codec = super::codec(conn)?;

    let envelope = STANDARD
        .decode(data.trim())
        .context("Envelope is not valid base64")?;
    if envelope.len() <= SIGNATURE_SIZE {
        ui::warning("Envelope is shorter than a signature");
    }

    let plaintext = codec
        .decrypt_request(&ctx, &envelope)
        .map_err(KaspayError::from)?;
    ui::success("Signature verified");
    println!("{}", String::from_utf8_lossy(&plaintext));

    Ok(())
}
