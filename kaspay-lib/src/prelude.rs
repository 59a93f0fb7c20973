//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use kaspay_lib::prelude::*;
//! ```

// Client
pub use crate::client::{
    ApiResponse, ClientConfig, EscrowState, EscrowStatus, KaspayClient, LinkAttempt,
    OperationStatus, TlsVerification, Unlinked,
};

// Keys and envelopes
pub use crate::cipher::{Cipher, KeyPolicy};
pub use crate::envelope::EnvelopeCodec;
pub use crate::keys::ApiKeys;
pub use crate::params::{CallContext, CallParameters, Verb};

// Error handling
pub use crate::errors::{KaspayError, KaspayErrorCode};
pub use crate::Result;

// Transport
pub use crate::transport::{HttpTransport, TransportRequest, TransportResponse};
