//! Immutable data types for export retrieval.

pub mod info;
pub mod options;

pub use info::ExportInfo;
pub use options::FetchOptions;
