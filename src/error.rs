//! Error types for thumbnail-maker
//!
//! This module provides the error taxonomy for the pipeline:
//! - [`FetchError`] - failures while retrieving a single image
//! - [`TransformError`] - decode, resize and encode failures for a single file
//! - [`Error`] - the top-level error returned by run-level operations
//!
//! Per-item errors ([`FetchError`], [`TransformError`]) are normally collected
//! into the phase reports rather than returned; only run-fatal conditions
//! (directory creation, listing the staging area, bad configuration) surface
//! as an `Err` from the public operations.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for thumbnail-maker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for thumbnail-maker
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "target_sizes")
        key: Option<String>,
    },

    /// Image retrieval error
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Image transform error (decode, resize, encode)
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Logging could not be initialized
    #[error("logging error: {0}")]
    Logging(String),
}

impl Error {
    /// Shorthand for a configuration error on a specific key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

/// Errors raised while retrieving one image into the staging area
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be parsed or has no usable filename
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL as supplied by the caller
        url: String,
        /// Why the URL was rejected
        reason: String,
    },

    /// Another URL in the same batch already claimed this filename
    #[error("filename '{filename}' for '{url}' is already used by another URL in this batch")]
    FilenameCollision {
        /// The URL that lost the collision
        url: String,
        /// The contested staging filename
        filename: String,
    },

    /// The server answered with a non-success status
    #[error("HTTP {status} fetching '{url}'")]
    Http {
        /// The requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The fetch did not finish before the configured deadline
    #[error("timeout fetching '{url}' (exceeded {}s)", timeout.as_secs())]
    Timeout {
        /// The requested URL
        url: String,
        /// The deadline that was exceeded
        timeout: Duration,
    },

    /// Transport-level failure (DNS, connect, body read)
    #[error("request to '{url}' failed: {source}")]
    Request {
        /// The requested URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The retrieved bytes could not be written to the staging area
    #[error("failed to write {path}: {source}")]
    Write {
        /// Destination path in the staging area
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The download task itself failed (panicked or was aborted)
    #[error("download task for '{url}' failed: {reason}")]
    TaskFailed {
        /// The URL the task was fetching
        url: String,
        /// Join error description
        reason: String,
    },
}

/// Errors raised while deriving thumbnails from one staged file
#[derive(Debug, Error)]
pub enum TransformError {
    /// The staged file is not a decodable image
    #[error("failed to decode {path}: {source}")]
    Decode {
        /// Path of the staged file
        path: PathBuf,
        /// Underlying codec error
        #[source]
        source: image::ImageError,
    },

    /// The computed target dimensions are not a valid image size
    #[error(
        "cannot resize {path} ({width}x{height}) to width {target_width}: computed height is zero"
    )]
    InvalidDimensions {
        /// Path of the staged file
        path: PathBuf,
        /// Original width
        width: u32,
        /// Original height
        height: u32,
        /// Requested target width
        target_width: u32,
    },

    /// The resized image could not be encoded
    #[error("failed to encode {path}: {source}")]
    Encode {
        /// Output path that was being produced
        path: PathBuf,
        /// Underlying codec error
        #[source]
        source: image::ImageError,
    },

    /// Reading the source, writing an output, or removing the source failed
    #[error("I/O failure on {path}: {source}")]
    Io {
        /// The path involved in the failed operation
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The worker running the transform panicked or was aborted
    #[error("resize task for {filename} failed: {reason}")]
    TaskFailed {
        /// Staged filename
        filename: String,
        /// Join error description
        reason: String,
    },
}
