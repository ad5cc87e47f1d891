//! Collaborator traits for the three retrieval stages.
//!
//! A pipeline run calls each of these at most once, in order. Errors are
//! rendered to strings by the pipeline, so any error type works.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use exportsync_archive::ExportArchive;
use exportsync_fetch::ExportInfo;

use crate::data::ResourceKey;

/// Resolves a key to the location of its export.
pub trait MetadataSource: Send + Sync + 'static {
    type Error: std::error::Error + Send + 'static;

    fn fetch_metadata(&self, key: &ResourceKey) -> impl Future<Output = Result<ExportInfo, Self::Error>> + Send;
}

/// Downloads the raw export bytes from a location.
pub trait ContentSource: Send + Sync + 'static {
    type Error: std::error::Error + Send + 'static;

    fn fetch_content(&self, location: &str) -> impl Future<Output = Result<Bytes, Self::Error>> + Send;
}

/// Turns raw export bytes into a structured archive.
pub trait ArchiveDecoder: Send + Sync + 'static {
    type Error: std::error::Error + Send + 'static;

    fn decode(&self, data: Bytes) -> Result<ExportArchive, Self::Error>;
}

impl<T: MetadataSource> MetadataSource for Arc<T> {
    type Error = T::Error;

    fn fetch_metadata(&self, key: &ResourceKey) -> impl Future<Output = Result<ExportInfo, Self::Error>> + Send {
        (**self).fetch_metadata(key)
    }
}

impl<T: ContentSource> ContentSource for Arc<T> {
    type Error = T::Error;

    fn fetch_content(&self, location: &str) -> impl Future<Output = Result<Bytes, Self::Error>> + Send {
        (**self).fetch_content(location)
    }
}

impl<T: ArchiveDecoder> ArchiveDecoder for Arc<T> {
    type Error = T::Error;

    fn decode(&self, data: Bytes) -> Result<ExportArchive, Self::Error> { (**self).decode(data) }
}
