//! Core types for thumbnail-maker

use crate::error::{FetchError, TransformError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// One image to retrieve: the source URL and the staging filename derived from it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageTask {
    /// Parsed source URL
    pub url: Url,
    /// Filename in the staging area (the URL's last path segment, verbatim)
    pub filename: String,
}

impl ImageTask {
    /// Parse `url` and derive its staging filename
    ///
    /// The filename is the last path segment, used as-is: no percent-decoding,
    /// no sanitization. Query strings and fragments are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use thumbnail_maker::ImageTask;
    ///
    /// let task = ImageTask::from_url("https://example.com/photos/cat.jpg?size=full").unwrap();
    /// assert_eq!(task.filename, "cat.jpg");
    ///
    /// assert!(ImageTask::from_url("https://example.com/photos/").is_err());
    /// ```
    pub fn from_url(url: &str) -> Result<Self, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let filename = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .ok_or_else(|| FetchError::InvalidUrl {
                url: url.to_string(),
                reason: "URL path has no filename component".to_string(),
            })?;

        Ok(Self {
            url: parsed,
            filename,
        })
    }
}

/// A URL that could not be retrieved
#[derive(Debug)]
pub struct DownloadFailure {
    /// The URL as supplied by the caller
    pub url: String,
    /// Why the fetch failed
    pub error: FetchError,
}

/// Outcome of one download phase
#[derive(Debug, Default)]
pub struct DownloadReport {
    /// Staged files, in the order their URLs were given
    pub downloaded: Vec<PathBuf>,
    /// URLs that failed, in the order they were given
    pub failures: Vec<DownloadFailure>,
    /// Wall-clock time from launch to barrier
    pub elapsed: Duration,
}

impl DownloadReport {
    /// True when every URL was staged
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A staged source that was fully transformed and removed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessedImage {
    /// Staged filename the thumbnails were derived from
    pub source: String,
    /// Output files, one per target width in ascending width order
    pub outputs: Vec<PathBuf>,
}

/// A staged file that could not be transformed (its source is left in place)
#[derive(Debug)]
pub struct ResizeFailure {
    /// Staged filename
    pub filename: String,
    /// Why the transform failed
    pub error: TransformError,
}

/// Outcome of one resize phase
#[derive(Debug, Default)]
pub struct ResizeReport {
    /// Sources processed successfully, sorted by filename
    pub processed: Vec<ProcessedImage>,
    /// Sources that failed, sorted by filename
    pub failures: Vec<ResizeFailure>,
    /// Wall-clock time for the whole phase
    pub elapsed: Duration,
}

impl ResizeReport {
    /// True when every staged file was processed
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total number of thumbnails written
    pub fn thumbnail_count(&self) -> usize {
        self.processed.iter().map(|p| p.outputs.len()).sum()
    }
}

/// Outcome of a full `make_thumbnails` run
#[derive(Debug)]
pub struct RunReport {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Download phase outcome
    pub download: DownloadReport,
    /// Resize phase outcome
    pub resize: ResizeReport,
    /// Wall-clock time for the whole run
    pub elapsed: Duration,
}

impl RunReport {
    /// True when both phases finished without per-item failures
    pub fn is_complete(&self) -> bool {
        self.download.is_complete() && self.resize.is_complete()
    }
}

/// Events emitted while the pipeline runs
///
/// Delivered over a broadcast channel; see
/// [`ThumbnailMakerService::subscribe`](crate::ThumbnailMakerService::subscribe).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A fetch was launched
    DownloadStarted {
        /// Source URL
        url: String,
    },

    /// A fetch finished and its bytes are staged
    Downloaded {
        /// Source URL
        url: String,
        /// Path of the staged file
        path: PathBuf,
        /// Number of bytes written
        bytes: u64,
    },

    /// A fetch failed
    DownloadFailed {
        /// Source URL
        url: String,
        /// Error description
        error: String,
    },

    /// One thumbnail was written
    ThumbnailCreated {
        /// Staged filename
        source: String,
        /// Output path
        path: PathBuf,
        /// Output width
        width: u32,
        /// Output height
        height: u32,
    },

    /// A staged file could not be transformed
    ResizeFailed {
        /// Staged filename
        source: String,
        /// Error description
        error: String,
    },

    /// A fully processed source was removed from the staging area
    SourceRemoved {
        /// Staged filename
        source: String,
    },
}
