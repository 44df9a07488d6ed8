//! # thumbnail-maker
//!
//! Fetches a batch of remote images concurrently and derives resized
//! variants of each one.
//!
//! The pipeline has two phases with deliberately different concurrency:
//! - **Download** (I/O bound) - one task per URL, all in flight at once
//!   unless a cap is configured, joined by a full barrier
//! - **Resize** (CPU bound) - a worker pool sized to the available cores,
//!   each worker producing every target width for one staged file
//!
//! Raw downloads land in `<home>/incoming`, thumbnails in
//! `<home>/outgoing` as `<stem>_<width><ext>`, and each source is removed
//! once all of its thumbnails exist.
//!
//! ## Quick Start
//!
//! ```no_run
//! use thumbnail_maker::{Config, ThumbnailMakerService, logging};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::with_home_dir("./work");
//!     let _log_guard = logging::init_logging(&config.logging)?;
//!
//!     let service = ThumbnailMakerService::new(config)?;
//!
//!     // Subscribe to events
//!     let mut events = service.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let report = service
//!         .make_thumbnails(&["https://example.com/a.jpg", "https://example.com/b.png"])
//!         .await?;
//!     assert!(report.is_complete());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Batch download phase
pub mod downloader;
/// Error types
pub mod error;
/// Image retrieval
pub mod fetcher;
/// Log sink setup
pub mod logging;
/// Pipeline orchestration
pub mod service;
/// Thumbnail generation phase
pub mod thumbnail;
/// Core types, reports and events
pub mod types;
/// Filename helpers
pub mod utils;

// Re-export commonly used types
pub use config::{Config, DownloadConfig, FilenameCollision, LogConfig, ResizeConfig};
pub use downloader::BatchDownloader;
pub use error::{Error, FetchError, Result, TransformError};
pub use fetcher::{Fetcher, HttpFetcher};
pub use service::ThumbnailMakerService;
pub use thumbnail::ThumbnailMaker;
pub use types::{
    DownloadFailure, DownloadReport, Event, ImageTask, ProcessedImage, ResizeFailure,
    ResizeReport, RunReport,
};
