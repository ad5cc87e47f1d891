use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::Stream;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Asynchronous HTTP client abstraction.
///
/// Implementations handle redirects, timeouts, and map non-success status
/// codes to an error before the body stream is returned.
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - Mock implementations for testing
pub trait HttpClient: Send + Sync {
    /// Error type for HTTP operations.
    type Error: std::error::Error + Send + 'static;

    /// Issue a GET request and return the response body as a stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails (DNS failure, connection error,
    /// HTTP error status, timeout).
    fn stream(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = std::result::Result<BoxStream<'static, std::result::Result<Bytes, Self::Error>>, Self::Error>>
           + Send;
}

impl<T: HttpClient> HttpClient for Arc<T> {
    type Error = T::Error;

    fn stream(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = std::result::Result<BoxStream<'static, std::result::Result<Bytes, Self::Error>>, Self::Error>>
           + Send {
        (**self).stream(url, headers)
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use futures_util::StreamExt;

    use super::*;
    use crate::data::FetchOptions;
    use crate::error::{FetchError, Result};

    /// Production HTTP client implementation using reqwest.
    #[derive(Clone, Debug)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        /// Create a client whose requests time out after `timeout`.
        pub fn new(timeout: Duration) -> Result<Self> {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| FetchError::Client(e.to_string()))?;
            Ok(Self { client })
        }

        /// Create a client using [`FetchOptions::timeout`].
        pub fn from_options(options: &FetchOptions) -> Result<Self> { Self::new(options.timeout) }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn stream(
            &self,
            url: &str,
            headers: &[(String, String)],
        ) -> std::result::Result<BoxStream<'static, std::result::Result<Bytes, Self::Error>>, Self::Error> {
            let mut request = self.client.get(url);

            for (key, value) in headers {
                request = request.header(key, value);
            }

            let response = request.send().await?.error_for_status()?;
            let stream = response.bytes_stream().map(|result| result.map(Bytes::from));

            Ok(Box::pin(stream))
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
