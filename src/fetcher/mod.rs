//! Resource retrieval into the staging area
//!
//! - [`Fetcher`] - the retrieval capability (trait)
//! - [`HttpFetcher`] - production implementation on reqwest
//! - [`download_image`] - fetch one [`ImageTask`] and persist it

mod http;
mod traits;

pub use http::HttpFetcher;
pub use traits::Fetcher;

use crate::error::FetchError;
use crate::types::ImageTask;
use std::path::{Path, PathBuf};
use tracing::info;

/// Fetch one image and write it to `<staging_dir>/<task.filename>`
///
/// An existing file of the same name is overwritten. Returns the staged
/// path and the number of bytes written.
pub async fn download_image(
    fetcher: &dyn Fetcher,
    task: &ImageTask,
    staging_dir: &Path,
) -> Result<(PathBuf, u64), FetchError> {
    info!(url = %task.url, fetcher = fetcher.name(), "downloading image");

    let bytes = fetcher.fetch(&task.url).await?;

    let path = staging_dir.join(&task.filename);
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| FetchError::Write {
            path: path.clone(),
            source: e,
        })?;

    info!(url = %task.url, path = %path.display(), bytes = bytes.len(), "image saved");
    Ok((path, bytes.len() as u64))
}
