//! Request-coalescing retrieval of application export archives.
//!
//! # Architecture
//!
//! - [`data`] - Keys, waiter tokens, and the shared outcome type
//! - [`stage`] - Traits for the metadata, content, and decode collaborators
//! - [`pipeline`] - Sequencing of the three stages for one key
//! - [`registry`] - Single-flight bookkeeping and outcome broadcast
//! - [`sources`] - Stage implementations over HTTP and zip
//!
//! Any number of callers may ask for the same key at once. Only the first
//! launches a retrieval; the others join it, and all of them receive the same
//! outcome when it completes. Once delivered, the key is forgotten, so the
//! next request starts a fresh retrieval.
//!
//! # Example
//!
//! ```no_run
//! use exportsync::{HttpRegistry, RetrieverConfig};
//! use exportsync_fetch::ReqwestClient;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RetrieverConfig::from_path("exportsync.toml")?.with_env_overrides();
//! let registry = HttpRegistry::<ReqwestClient>::from_config(&config)?;
//!
//! let archive = registry.retrieve("app-42").await?;
//! for name in archive.names() {
//!     println!("{name}");
//! }
//! # Ok(())
//! # }
//! ```

mod broadcast;
pub mod config;
pub mod data;
mod error;
pub mod pipeline;
pub mod registry;
pub mod sources;
pub mod stage;
mod waiter;

pub use config::{ExportConfiguration, RetrieverConfig};
pub use data::{Outcome, ResourceKey, WaiterToken};
pub use error::{ConfigError, Result, RetrieveError};
pub use exportsync_archive::ExportArchive;
pub use exportsync_fetch::ExportInfo;
pub use pipeline::{Pipeline, PipelineStage, StageHook};
pub use registry::{AttachStatus, Attachment, Registry};
pub use sources::{HttpPipeline, HttpRegistry, ZipDecoder, http_pipeline};
pub use stage::{ArchiveDecoder, ContentSource, MetadataSource};
pub use waiter::Waiter;
