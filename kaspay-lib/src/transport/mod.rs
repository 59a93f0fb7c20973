//! Transport boundary between the client and the network.
//!
//! The client only needs "send these three fields, get back status and body".
//! [`HttpTransport`] is that contract; [`ReqwestTransport`] is the production
//! implementation behind the `http-transport` feature.

#[cfg(feature = "http-transport")]
mod reqwest_transport;
mod traits;

#[cfg(feature = "http-transport")]
pub use reqwest_transport::ReqwestTransport;
pub use traits::{
    HttpTransport, RequestParams, TransportRequest, TransportResponse, PARAM_DATA,
    PARAM_TIMESTAMP, PARAM_UACCOUNT,
};
