//! Stage implementations backed by `exportsync-fetch` and
//! `exportsync-archive`.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use exportsync_archive::{DecodeOptions, ExportArchive};
use exportsync_fetch::{ExportClient, ExportInfo, FetchError, HttpClient};

use crate::config::RetrieverConfig;
use crate::data::ResourceKey;
use crate::pipeline::Pipeline;
use crate::registry::Registry;
use crate::stage::{ArchiveDecoder, ContentSource, MetadataSource};

impl<H: HttpClient + 'static> MetadataSource for ExportClient<H> {
    type Error = FetchError;

    fn fetch_metadata(&self, key: &ResourceKey) -> impl Future<Output = Result<ExportInfo, FetchError>> + Send {
        self.fetch_info(key.as_str())
    }
}

impl<H: HttpClient + 'static> ContentSource for ExportClient<H> {
    type Error = FetchError;

    fn fetch_content(&self, location: &str) -> impl Future<Output = Result<Bytes, FetchError>> + Send {
        ExportClient::fetch_content(self, location)
    }
}

/// Decodes zip exports in memory.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZipDecoder {
    options: DecodeOptions,
}

impl ZipDecoder {
    pub fn new(options: DecodeOptions) -> Self { Self { options } }
}

impl ArchiveDecoder for ZipDecoder {
    type Error = exportsync_archive::Error;

    fn decode(&self, data: Bytes) -> Result<ExportArchive, Self::Error> { exportsync_archive::decode(&data, &self.options) }
}

/// Pipeline fetching over HTTP and decoding zips.
pub type HttpPipeline<H> = Pipeline<Arc<ExportClient<H>>, Arc<ExportClient<H>>, ZipDecoder>;

/// Registry over an [`HttpPipeline`].
pub type HttpRegistry<H> = Registry<Arc<ExportClient<H>>, Arc<ExportClient<H>>, ZipDecoder>;

/// Build the HTTP pipeline for `config` around an existing client.
pub fn http_pipeline<H: HttpClient + 'static>(client: H, config: &RetrieverConfig) -> HttpPipeline<H> {
    let export = Arc::new(ExportClient::new(client, config.fetch_options()));
    Pipeline::new(Arc::clone(&export), export, ZipDecoder::new(config.decode_options()))
}

#[cfg(feature = "reqwest")]
mod reqwest_sources {
    use exportsync_fetch::ReqwestClient;

    use super::*;
    use crate::error::ConfigError;

    impl HttpRegistry<ReqwestClient> {
        /// Validate `config` and build a registry that talks to the export
        /// API with `reqwest`.
        pub fn from_config(config: &RetrieverConfig) -> Result<Self, ConfigError> {
            config.validate()?;
            let client =
                ReqwestClient::from_options(&config.fetch_options()).map_err(|e| ConfigError::Client(e.to_string()))?;
            Ok(Registry::new(http_pipeline(client, config)))
        }
    }
}
