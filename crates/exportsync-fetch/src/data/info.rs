use serde::{Deserialize, Serialize};

/// Response body of the export-info endpoint.
///
/// Only `uri` is required; other fields the service may add are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportInfo {
    /// Signed download location of the export archive.
    pub uri: String,
}

impl ExportInfo {
    pub fn new(uri: impl Into<String>) -> Self { Self { uri: uri.into() } }
}
