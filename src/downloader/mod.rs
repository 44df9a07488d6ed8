//! Batch download phase
//!
//! [`BatchDownloader::download_all`] launches one task per URL, waits for
//! every task to finish (full barrier) and collects per-URL failures into a
//! [`DownloadReport`] instead of aborting the batch.

mod collision;


use crate::config::{DownloadConfig, FilenameCollision};
use crate::error::{Error, FetchError, Result};
use crate::fetcher::{Fetcher, download_image};
use crate::types::{DownloadFailure, DownloadReport, Event, ImageTask};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Semaphore, broadcast};
use tracing::{info, warn};

/// Downloads batches of images into the staging area
#[derive(Clone)]
pub struct BatchDownloader {
    fetcher: Arc<dyn Fetcher>,
    staging_dir: PathBuf,
    /// Caps in-flight fetches when configured (None = one task per URL, all at once)
    concurrent_limit: Option<Arc<Semaphore>>,
    max_concurrent: Option<usize>,
    collision: FilenameCollision,
    event_tx: broadcast::Sender<Event>,
}

impl BatchDownloader {
    /// Create a downloader writing into `staging_dir`
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        staging_dir: PathBuf,
        config: &DownloadConfig,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            fetcher,
            staging_dir,
            concurrent_limit: config
                .max_concurrent_downloads
                .map(|limit| Arc::new(Semaphore::new(limit))),
            max_concurrent: config.max_concurrent_downloads,
            collision: config.filename_collision,
            event_tx,
        }
    }

    /// Staging directory this downloader writes into
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Download every URL into the staging area
    ///
    /// An empty list returns immediately without touching the filesystem.
    /// Otherwise the staging directory is created if needed and one task is
    /// spawned per URL. The call returns only after every task has finished.
    /// Per-URL failures (bad URL, filename collision, HTTP error, write error,
    /// panicked task) are reported in [`DownloadReport::failures`]; only a
    /// failure to create the staging directory is returned as `Err`.
    pub async fn download_all<S: AsRef<str>>(&self, urls: &[S]) -> Result<DownloadReport> {
        if urls.is_empty() {
            return Ok(DownloadReport::default());
        }

        tokio::fs::create_dir_all(&self.staging_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create staging directory '{}': {}",
                        self.staging_dir.display(),
                        e
                    ),
                ))
            })?;

        info!(
            count = urls.len(),
            concurrency_cap = ?self.max_concurrent,
            "beginning image downloads"
        );

        let start = Instant::now();
        let planned = collision::plan_tasks(urls, self.collision);

        let mut outcomes: Vec<Option<std::result::Result<PathBuf, FetchError>>> =
            Vec::with_capacity(urls.len());
        let mut handles = Vec::new();

        for (index, plan) in planned.into_iter().enumerate() {
            match plan {
                Ok(task) => {
                    outcomes.push(None);
                    handles.push((index, task.url.to_string(), self.spawn_fetch(task)));
                }
                Err(e) => outcomes.push(Some(Err(e))),
            }
        }

        // Barrier: wait for every launched task, successful or not
        let joined = join_all(handles.into_iter().map(|(index, url, handle)| async move {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(FetchError::TaskFailed {
                    url,
                    reason: join_err.to_string(),
                }),
            };
            (index, outcome)
        }))
        .await;

        for (index, outcome) in joined {
            outcomes[index] = Some(outcome);
        }

        let mut report = DownloadReport::default();
        for (url, outcome) in urls.iter().zip(outcomes) {
            let url: &str = url.as_ref();
            match outcome {
                Some(Ok(path)) => report.downloaded.push(path),
                Some(Err(error)) => {
                    warn!(url, error = %error, "image download failed");
                    self.event_tx
                        .send(Event::DownloadFailed {
                            url: url.to_string(),
                            error: error.to_string(),
                        })
                        .ok();
                    report.failures.push(DownloadFailure {
                        url: url.to_string(),
                        error,
                    });
                }
                None => {}
            }
        }
        report.elapsed = start.elapsed();

        info!(
            downloaded = report.downloaded.len(),
            failed = report.failures.len(),
            elapsed_secs = report.elapsed.as_secs_f64(),
            "downloaded {} images in {:.3} seconds",
            urls.len(),
            report.elapsed.as_secs_f64()
        );

        Ok(report)
    }

    fn spawn_fetch(
        &self,
        task: ImageTask,
    ) -> tokio::task::JoinHandle<std::result::Result<PathBuf, FetchError>> {
        let fetcher = Arc::clone(&self.fetcher);
        let staging_dir = self.staging_dir.clone();
        let concurrent_limit = self.concurrent_limit.clone();
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            let _permit = match concurrent_limit {
                Some(limit) => Some(limit.acquire_owned().await.map_err(|e| {
                    FetchError::TaskFailed {
                        url: task.url.to_string(),
                        reason: e.to_string(),
                    }
                })?),
                None => None,
            };

            event_tx
                .send(Event::DownloadStarted {
                    url: task.url.to_string(),
                })
                .ok();

            let (path, bytes) = download_image(fetcher.as_ref(), &task, &staging_dir).await?;

            event_tx
                .send(Event::Downloaded {
                    url: task.url.to_string(),
                    path: path.clone(),
                    bytes,
                })
                .ok();

            Ok(path)
        })
    }
}
