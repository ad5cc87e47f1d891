//! I/O operations for export retrieval.
//!
//! Everything that touches the network lives here, behind the
//! [`HttpClient`] trait so the retrieval logic can be driven by mocks.

mod client;
mod http;

pub use client::ExportClient;
pub use http::{BoxStream, HttpClient};
#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
