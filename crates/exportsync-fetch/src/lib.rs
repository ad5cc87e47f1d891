//! Export-info and export-content retrieval over a pluggable HTTP client.
//!
//! # Architecture
//!
//! - [`data`] - Immutable configuration and response types
//! - [`effects`] - Network I/O behind the [`HttpClient`] trait
//!
//! Retrieving an export takes two requests: one to the export-info endpoint,
//! which answers with a download location, and one to that location for the
//! archive bytes. [`ExportClient`] performs each as a separate call so a
//! caller can sequence and report them individually.

pub mod data;
pub mod effects;
mod error;

pub use data::{ExportInfo, FetchOptions};
pub use effects::{BoxStream, ExportClient, HttpClient};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use error::{FetchError, Result};
