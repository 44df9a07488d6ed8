//! Pipeline orchestration: download everything, then resize everything

use crate::config::Config;
use crate::downloader::BatchDownloader;
use crate::error::Result;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::thumbnail::ThumbnailMaker;
use crate::types::{DownloadReport, Event, ResizeReport, RunReport};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tracing::info;

/// Capacity of the event channel; slow subscribers miss older events
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Downloads batches of images and turns them into thumbnails
///
/// Cloneable; clones share the fetcher, worker pool and event channel.
///
/// # Examples
///
/// ```no_run
/// use thumbnail_maker::{Config, ThumbnailMakerService};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let service = ThumbnailMakerService::new(Config::with_home_dir("/tmp/thumbs"))?;
///
///     let report = service
///         .make_thumbnails(&[
///             "https://example.com/images/a.jpg",
///             "https://example.com/images/b.png",
///         ])
///         .await?;
///
///     println!(
///         "{} thumbnails, {} failures",
///         report.resize.thumbnail_count(),
///         report.download.failures.len() + report.resize.failures.len()
///     );
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct ThumbnailMakerService {
    config: Arc<Config>,
    downloader: BatchDownloader,
    thumbnailer: ThumbnailMaker,
    event_tx: broadcast::Sender<Event>,
}

impl ThumbnailMakerService {
    /// Create a service that fetches over HTTP
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::new(&config.download)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Create a service with a custom [`Fetcher`]
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        config.validate()?;

        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let downloader = BatchDownloader::new(
            fetcher,
            config.incoming_dir(),
            &config.download,
            event_tx.clone(),
        );
        let thumbnailer = ThumbnailMaker::from_config(&config, event_tx.clone());

        Ok(Self {
            config: Arc::new(config),
            downloader,
            thumbnailer,
            event_tx,
        })
    }

    /// Configuration this service runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Subscribe to pipeline events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Download phase only: stage every URL
    pub async fn download_images<S: AsRef<str>>(&self, urls: &[S]) -> Result<DownloadReport> {
        self.downloader.download_all(urls).await
    }

    /// Resize phase only: thumbnail everything currently staged
    pub async fn perform_resizing(&self) -> Result<ResizeReport> {
        self.thumbnailer.resize_all().await
    }

    /// Download every URL, then thumbnail everything staged
    ///
    /// Resizing starts only after every download has finished. Per-item
    /// failures are collected in the returned [`RunReport`]; an `Err` means a
    /// phase could not run at all.
    pub async fn make_thumbnails<S: AsRef<str>>(&self, urls: &[S]) -> Result<RunReport> {
        info!(
            count = urls.len(),
            home_dir = %self.config.home_dir.display(),
            "START make_thumbnails"
        );
        let started_at = Utc::now();
        let start = Instant::now();

        let download = self.download_images(urls).await?;
        let resize = self.perform_resizing().await?;

        let elapsed = start.elapsed();
        info!(
            downloaded = download.downloaded.len(),
            download_failures = download.failures.len(),
            thumbnails = resize.thumbnail_count(),
            resize_failures = resize.failures.len(),
            elapsed_secs = elapsed.as_secs_f64(),
            "END make_thumbnails in {:.3} seconds",
            elapsed.as_secs_f64()
        );

        Ok(RunReport {
            started_at,
            download,
            resize,
            elapsed,
        })
    }
}
