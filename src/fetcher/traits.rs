//! Trait for retrieving image bytes

use crate::error::FetchError;
use async_trait::async_trait;
use url::Url;

/// Retrieves the raw bytes behind a URL
///
/// This is the seam between the pipeline and the network. [`HttpFetcher`]
/// is the production implementation; tests and embedders can supply their
/// own (local mirrors, canned fixtures, instrumented fetchers).
///
/// [`HttpFetcher`]: super::HttpFetcher
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use thumbnail_maker::error::FetchError;
/// use thumbnail_maker::fetcher::Fetcher;
/// use url::Url;
///
/// struct Canned(Vec<u8>);
///
/// #[async_trait]
/// impl Fetcher for Canned {
///     async fn fetch(&self, _url: &Url) -> Result<Vec<u8>, FetchError> {
///         Ok(self.0.clone())
///     }
///
///     fn name(&self) -> &'static str {
///         "canned"
///     }
/// }
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieve the full body behind `url`
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the resource cannot be retrieved.
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
