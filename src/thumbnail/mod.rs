//! Thumbnail generation phase
//!
//! - [`calculations`] - aspect-ratio math, no I/O
//! - `codec` - decode/resize/encode via the `image` crate
//! - `transform` - the per-file job (temp outputs, publish, remove source)
//!
//! [`ThumbnailMaker::resize_all`] runs the per-file job on blocking threads,
//! with at most `workers` files in flight.

pub mod calculations;
mod codec;
mod transform;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use calculations::target_dimensions;

use crate::config::Config;
use crate::error::{Error, Result, TransformError};
use crate::types::{Event, ResizeFailure, ResizeReport};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Semaphore, broadcast};
use tracing::{info, warn};

/// Turns staged images into thumbnails
#[derive(Clone)]
pub struct ThumbnailMaker {
    staging_dir: PathBuf,
    output_dir: PathBuf,
    /// Ascending, deduplicated
    target_sizes: Arc<[u32]>,
    workers: usize,
    worker_limit: Arc<Semaphore>,
    event_tx: broadcast::Sender<Event>,
}

impl ThumbnailMaker {
    /// Create a thumbnail maker for the given directories
    ///
    /// `target_sizes` is sorted and deduplicated; `workers` is clamped to at least one.
    pub fn new(
        staging_dir: PathBuf,
        output_dir: PathBuf,
        target_sizes: &[u32],
        workers: usize,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        let mut sizes = target_sizes.to_vec();
        sizes.sort_unstable();
        sizes.dedup();
        let workers = workers.max(1);

        Self {
            staging_dir,
            output_dir,
            target_sizes: sizes.into(),
            workers,
            worker_limit: Arc::new(Semaphore::new(workers)),
            event_tx,
        }
    }

    /// Create a thumbnail maker for the directories and sizes in `config`
    pub fn from_config(config: &Config, event_tx: broadcast::Sender<Event>) -> Self {
        Self::new(
            config.incoming_dir(),
            config.outgoing_dir(),
            &config.target_sizes,
            config.resize.effective_workers(),
            event_tx,
        )
    }

    /// Staging directory images are read from
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Output directory thumbnails are written to
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Widths produced for every image, ascending
    pub fn target_sizes(&self) -> &[u32] {
        &self.target_sizes
    }

    /// Generate thumbnails for every file currently in the staging area
    ///
    /// The staging listing is taken once at entry. A missing or empty staging
    /// area returns an empty report without creating the output directory.
    /// Per-file failures leave the source in place and are reported in
    /// [`ResizeReport::failures`]; creating the output directory or listing
    /// the staging area are the only failures returned as `Err`.
    pub async fn resize_all(&self) -> Result<ResizeReport> {
        let filenames = self.list_staged().await?;
        if filenames.is_empty() {
            return Ok(ResizeReport::default());
        }

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create output directory '{}': {}",
                        self.output_dir.display(),
                        e
                    ),
                ))
            })?;

        info!(
            count = filenames.len(),
            workers = self.workers,
            target_sizes = ?self.target_sizes,
            "beginning image resizing"
        );
        let start = Instant::now();

        let mut handles = Vec::with_capacity(filenames.len());
        for filename in &filenames {
            // The semaphore is never closed
            let permit = Arc::clone(&self.worker_limit)
                .acquire_owned()
                .await
                .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;

            let filename = filename.clone();
            let staging_dir = self.staging_dir.clone();
            let output_dir = self.output_dir.clone();
            let target_sizes = Arc::clone(&self.target_sizes);
            let event_tx = self.event_tx.clone();

            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                transform::transform_file(
                    &filename,
                    &staging_dir,
                    &output_dir,
                    &target_sizes,
                    &event_tx,
                )
            }));
        }

        // Barrier: every file finishes before the phase reports
        let results = join_all(handles).await;

        let mut report = ResizeReport::default();
        for (filename, result) in filenames.into_iter().zip(results) {
            let outcome = result.unwrap_or_else(|join_err| {
                Err(TransformError::TaskFailed {
                    filename: filename.clone(),
                    reason: join_err.to_string(),
                })
            });

            match outcome {
                Ok(processed) => report.processed.push(processed),
                Err(error) => {
                    warn!(source = %filename, error = %error, "image resize failed, source kept");
                    self.event_tx
                        .send(Event::ResizeFailed {
                            source: filename.clone(),
                            error: error.to_string(),
                        })
                        .ok();
                    report.failures.push(ResizeFailure { filename, error });
                }
            }
        }
        report.elapsed = start.elapsed();

        info!(
            processed = report.processed.len(),
            failed = report.failures.len(),
            thumbnails = report.thumbnail_count(),
            elapsed_secs = report.elapsed.as_secs_f64(),
            "created {} thumbnails in {:.3} seconds",
            report.processed.len() + report.failures.len(),
            report.elapsed.as_secs_f64()
        );

        Ok(report)
    }

    /// Regular files in the staging area, sorted by name
    async fn list_staged(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.staging_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to list staging directory '{}': {}",
                        self.staging_dir.display(),
                        e
                    ),
                )));
            }
        };

        let mut filenames = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => filenames.push(name),
                Err(name) => {
                    warn!(name = ?name, "skipping staged file with non UTF-8 name");
                }
            }
        }
        filenames.sort();
        Ok(filenames)
    }
}
