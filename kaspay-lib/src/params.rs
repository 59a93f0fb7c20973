//! Call parameters: the request descriptor covered by the envelope signature.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::KaspayError;

/// Signing-string field separator.
pub const SEPARATOR: u8 = b'&';

/// HTTP verbs accepted by the Kaspay API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    /// Method token as it appears on the wire and in the signing string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = KaspayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            _ => Err(KaspayError::invalid_data(
                "verb",
                format!("unsupported HTTP verb '{}'", s),
            )),
        }
    }
}

/// The four fields bound into every envelope signature.
///
/// The signature covers the exact bytes of each field, so the context must
/// not change between sealing a request and the service verifying it. A new
/// context is built for every call; the timestamp alone makes two calls
/// differ.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallContext {
    verb: Verb,
    url: String,
    account: String,
    timestamp: i64,
}

impl CallContext {
    /// Create a context. `url` and `account` are used verbatim.
    pub fn new(verb: Verb, url: impl Into<String>, account: impl Into<String>, timestamp: i64) -> Self {
        Self {
            verb,
            url: url.into(),
            account: account.into(),
            timestamp,
        }
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The merchant's `uaccount` identifier.
    pub fn account(&self) -> &str {
        &self.account
    }

    /// UNIX timestamp in seconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Canonical byte string signed for `ciphertext`:
    /// `verb&url&account&timestamp&ciphertext`.
    ///
    /// The ciphertext is appended as raw bytes; nothing is escaped.
    pub fn signing_input(&self, ciphertext: &[u8]) -> Vec<u8> {
        let timestamp = self.timestamp.to_string();
        let mut out = Vec::with_capacity(
            self.verb.as_str().len()
                + self.url.len()
                + self.account.len()
                + timestamp.len()
                + ciphertext.len()
                + 4,
        );
        out.extend_from_slice(self.verb.as_str().as_bytes());
        out.push(SEPARATOR);
        out.extend_from_slice(self.url.as_bytes());
        out.push(SEPARATOR);
        out.extend_from_slice(self.account.as_bytes());
        out.push(SEPARATOR);
        out.extend_from_slice(timestamp.as_bytes());
        out.push(SEPARATOR);
        out.extend_from_slice(ciphertext);
        out
    }
}

/// A complete call: context plus the plaintext payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallParameters {
    context: CallContext,
    data: Vec<u8>,
}

impl CallParameters {
    pub fn new(
        verb: Verb,
        url: impl Into<String>,
        account: impl Into<String>,
        timestamp: i64,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            context: CallContext::new(verb, url, account, timestamp),
            data: data.into(),
        }
    }

    pub fn context(&self) -> &CallContext {
        &self.context
    }

    pub fn verb(&self) -> Verb {
        self.context.verb()
    }

    pub fn url(&self) -> &str {
        self.context.url()
    }

    pub fn account(&self) -> &str {
        self.context.account()
    }

    pub fn timestamp(&self) -> i64 {
        self.context.timestamp()
    }

    /// Plaintext payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_input_layout() {
        let ctx = CallContext::new(
            Verb::Post,
            "https://www.kaspay.com/api/v1/escrow/hold/TRX1",
            "merchant01",
            1_400_000_000,
        );
        let input = ctx.signing_input(&[0x00, 0xFF, b'&']);

        let mut expected =
            b"POST&https://www.kaspay.com/api/v1/escrow/hold/TRX1&merchant01&1400000000&".to_vec();
        expected.extend_from_slice(&[0x00, 0xFF, b'&']);
        assert_eq!(input, expected);
    }

    #[test]
    fn test_negative_timestamp_is_decimal() {
        let ctx = CallContext::new(Verb::Get, "u", "a", -5);
        assert_eq!(ctx.signing_input(b""), b"GET&u&a&-5&".to_vec());
    }

    #[test]
    fn test_verb_parsing() {
        assert_eq!("post".parse::<Verb>().unwrap(), Verb::Post);
        assert_eq!("DELETE".parse::<Verb>().unwrap(), Verb::Delete);
        assert!("PATCH".parse::<Verb>().is_err());
        assert_eq!(Verb::Put.to_string(), "PUT");
    }

    #[test]
    fn test_parameters_accessors() {
        let params = CallParameters::new(Verb::Get, "url", "acct", 42, b"{}".to_vec());
        assert_eq!(params.verb(), Verb::Get);
        assert_eq!(params.url(), "url");
        assert_eq!(params.account(), "acct");
        assert_eq!(params.timestamp(), 42);
        assert_eq!(params.data(), b"{}");
        assert_eq!(params.context().timestamp(), 42);
    }
}
