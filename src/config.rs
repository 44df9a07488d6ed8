//! Configuration types for thumbnail-maker

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the staging directory under the home directory
pub const INCOMING_DIR: &str = "incoming";

/// Name of the output directory under the home directory
pub const OUTGOING_DIR: &str = "outgoing";

/// Default thumbnail widths, in pixels
pub const DEFAULT_TARGET_SIZES: [u32; 3] = [32, 64, 200];

/// Download behavior configuration (fan-out, deadlines, naming)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Maximum number of in-flight fetches (None = one concurrent fetch per URL)
    #[serde(default)]
    pub max_concurrent_downloads: Option<usize>,

    /// Deadline for a single fetch, including the body (default: 60 seconds, None = no deadline)
    #[serde(
        default = "default_fetch_timeout",
        with = "optional_duration_serde"
    )]
    pub fetch_timeout: Option<Duration>,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// How to handle two URLs in one batch that map to the same staging filename
    #[serde(default)]
    pub filename_collision: FilenameCollision,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_concurrent_downloads: None,
            fetch_timeout: default_fetch_timeout(),
            user_agent: default_user_agent(),
            filename_collision: FilenameCollision::default(),
        }
    }
}

/// Filename collision handling for URLs sharing a basename
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilenameCollision {
    /// Keep the first URL, fail every later URL with the same basename (default)
    #[default]
    Reject,
    /// Suffix every colliding filename with a short hash of its full URL
    HashUrl,
}

/// Resize phase configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResizeConfig {
    /// Number of files transformed in parallel (None = available parallelism)
    #[serde(default)]
    pub workers: Option<usize>,
}

impl ResizeConfig {
    /// Effective worker count, falling back to the number of available cores
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// Log sink configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogConfig {
    /// File every log line is appended to (default: "logfile.log")
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Default level filter, overridden by `RUST_LOG` (default: "debug")
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            level: default_log_level(),
        }
    }
}

/// Main configuration for [`ThumbnailMakerService`](crate::ThumbnailMakerService)
///
/// Every field has a default, so `Config::default()` reproduces the classic
/// layout: `./incoming`, `./outgoing`, widths 32/64/200, unbounded download
/// fan-out and one resize worker per core.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Directory the staging and output areas live under (default: ".")
    #[serde(default = "default_home_dir")]
    pub home_dir: PathBuf,

    /// Thumbnail widths (default: 32, 64, 200)
    #[serde(default = "default_target_sizes")]
    pub target_sizes: Vec<u32>,

    /// Download phase settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// Resize phase settings
    #[serde(default)]
    pub resize: ResizeConfig,

    /// Log sink settings
    #[serde(default)]
    pub logging: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home_dir: default_home_dir(),
            target_sizes: default_target_sizes(),
            download: DownloadConfig::default(),
            resize: ResizeConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Config {
    /// Configuration rooted at `home_dir`, everything else default
    pub fn with_home_dir(home_dir: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: home_dir.into(),
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config file '{}': {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Staging directory (`<home>/incoming`)
    pub fn incoming_dir(&self) -> PathBuf {
        self.home_dir.join(INCOMING_DIR)
    }

    /// Output directory (`<home>/outgoing`)
    pub fn outgoing_dir(&self) -> PathBuf {
        self.home_dir.join(OUTGOING_DIR)
    }

    /// Check the configuration for values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.target_sizes.is_empty() {
            return Err(Error::config(
                "target_sizes",
                "at least one target width is required",
            ));
        }
        if self.target_sizes.contains(&0) {
            return Err(Error::config("target_sizes", "target widths must be non-zero"));
        }
        if self.download.max_concurrent_downloads == Some(0) {
            return Err(Error::config(
                "max_concurrent_downloads",
                "concurrency cap must be at least 1 (omit it for unbounded fan-out)",
            ));
        }
        if self.download.fetch_timeout == Some(Duration::ZERO) {
            return Err(Error::config(
                "fetch_timeout",
                "fetch timeout must be non-zero (omit it to disable the deadline)",
            ));
        }
        if self.resize.workers == Some(0) {
            return Err(Error::config("workers", "resize worker count must be at least 1"));
        }
        Ok(())
    }
}

fn default_home_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_target_sizes() -> Vec<u32> {
    DEFAULT_TARGET_SIZES.to_vec()
}

fn default_fetch_timeout() -> Option<Duration> {
    Some(Duration::from_secs(60))
}

fn default_user_agent() -> String {
    concat!("thumbnail-maker/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("logfile.log")
}

fn default_log_level() -> String {
    "debug".to_string()
}

// Optional Duration serialization helper (whole seconds)
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
