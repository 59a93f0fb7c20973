//! Error types for Kaspay API operations.
//!
//! The numeric codes keep the classification used by the Kaspay service's
//! other client libraries, so callers that log or surface a code see the
//! same value regardless of which client produced it.

use std::fmt;

use crate::cipher::CipherError;
use crate::envelope::EnvelopeError;

/// Error codes for FFI and cross-client reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum KaspayErrorCode {
    /// Call succeeded
    NoError = 0,
    /// Connection, TLS or timeout failure below HTTP
    Transport = 1,
    /// Service answered with a non-200 status
    Response = 2,
    /// Envelope verification or decryption failed
    Decryption = 3,
    /// Response body was not valid JSON
    Json = 4,
    /// Client misconfiguration (cipher backend, TLS, base URL)
    Configuration = 5,
    /// Key material could not be decoded or fitted
    InvalidKey = 6,
    /// Invalid request/data
    InvalidData = 7,
    /// Request serialization error
    Serialization = 8,
}

/// Comprehensive error type for Kaspay API operations.
#[derive(Debug)]
pub enum KaspayError {
    /// Transport layer error that is neither a connect failure nor a timeout.
    Transport(String),

    /// Connection failed.
    ConnectionFailed {
        /// Target URL
        target: String,
        /// Underlying error message
        reason: String,
    },

    /// Connection timeout.
    ConnectionTimeout {
        /// Operation that timed out
        operation: String,
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// The service returned a non-200 status with a plaintext error body.
    Api {
        /// HTTP status code
        status: u16,
        /// `error` field of the response body
        message: String,
    },

    /// Response body was not JSON.
    InvalidJson {
        /// HTTP status code
        status: u16,
        /// Parser message
        reason: String,
    },

    /// Envelope signature or decryption failure.
    Envelope(EnvelopeError),

    /// A 200 response whose body did not carry a base64 envelope string.
    MalformedEnvelope(String),

    /// No AES-256-CBC backend was compiled into this build.
    UnsupportedCipherEnvironment,

    /// Client configuration is invalid.
    Configuration(String),

    /// Key material is invalid.
    InvalidKey(String),

    /// Invalid data provided.
    InvalidData {
        /// Field or parameter name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Request payload serialization failed.
    Serialization(String),
}

impl KaspayError {
    /// Get the error code for FFI/cross-client reporting.
    pub fn code(&self) -> KaspayErrorCode {
        match self {
            Self::Transport(_) | Self::ConnectionFailed { .. } | Self::ConnectionTimeout { .. } => {
                KaspayErrorCode::Transport
            }
            Self::Api { .. } => KaspayErrorCode::Response,
            Self::Envelope(_) | Self::MalformedEnvelope(_) => KaspayErrorCode::Decryption,
            Self::InvalidJson { .. } => KaspayErrorCode::Json,
            Self::UnsupportedCipherEnvironment | Self::Configuration(_) => {
                KaspayErrorCode::Configuration
            }
            Self::InvalidKey(_) => KaspayErrorCode::InvalidKey,
            Self::InvalidData { .. } => KaspayErrorCode::InvalidData,
            Self::Serialization(_) => KaspayErrorCode::Serialization,
        }
    }

    /// Get the error message as an owned String (useful for FFI).
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status associated with the failure, `0` when the request never
    /// produced one.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Api { status, .. } | Self::InvalidJson { status, .. } => *status,
            Self::Envelope(_) | Self::MalformedEnvelope(_) => 200,
            _ => 0,
        }
    }

    /// Returns true if this error is potentially recoverable by retrying.
    ///
    /// Envelope failures are never retryable: the same bytes will fail again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::ConnectionFailed { .. } | Self::ConnectionTimeout { .. } => {
                true
            }
            Self::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }

    /// Returns a suggested retry delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::ConnectionTimeout { .. } => Some(1000),
            Self::ConnectionFailed { .. } => Some(2000),
            Self::Transport(_) => Some(1000),
            Self::Api { status: 429, .. } => Some(5000),
            Self::Api { status, .. } if (500..=599).contains(status) => Some(2000),
            _ => None,
        }
    }

    /// Create an invalid data error.
    pub fn invalid_data(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for KaspayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
            Self::ConnectionFailed { target, reason } => {
                write!(f, "connection to {} failed: {}", target, reason)
            }
            Self::ConnectionTimeout {
                operation,
                timeout_ms,
            } => {
                write!(f, "{} timed out after {}ms", operation, timeout_ms)
            }
            Self::Api { status, message } => {
                write!(f, "kaspay returned HTTP {}: {}", status, message)
            }
            Self::InvalidJson { status, reason } => {
                write!(f, "JSON parse error (HTTP {}): {}", status, reason)
            }
            Self::Envelope(err) => write!(f, "{}", err),
            Self::MalformedEnvelope(msg) => write!(f, "malformed response envelope: {}", msg),
            Self::UnsupportedCipherEnvironment => {
                write!(f, "no AES-256-CBC backend available in this build")
            }
            Self::Configuration(msg) => write!(f, "configuration error: {}", msg),
            Self::InvalidKey(msg) => write!(f, "invalid key: {}", msg),
            Self::InvalidData { field, reason } => {
                write!(f, "invalid {}: {}", field, reason)
            }
            Self::Serialization(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for KaspayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Envelope(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EnvelopeError> for KaspayError {
    fn from(err: EnvelopeError) -> Self {
        Self::Envelope(err)
    }
}

impl From<CipherError> for KaspayError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::InvalidKeyLength { .. } => Self::InvalidKey(err.to_string()),
            other => Self::Envelope(EnvelopeError::Encryption(other)),
        }
    }
}

impl From<serde_json::Error> for KaspayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
