//! Value types shared by the registry, the pipeline, and callers.

mod key;
mod token;

pub use key::ResourceKey;
pub use token::WaiterToken;

use std::sync::Arc;

use exportsync_archive::ExportArchive;

use crate::error::RetrieveError;

/// The single result of one retrieval, shared by every waiter.
pub type Outcome = Result<Arc<ExportArchive>, RetrieveError>;
