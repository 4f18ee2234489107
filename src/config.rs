//! Configuration types for luscious-dl
//!
//! The configuration is persisted as pretty-printed JSON. Every field has a default,
//! so a partial or empty file still loads, and a missing file is created with the
//! defaults on first run.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file location
pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

/// Worklist file locations
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorklistConfig {
    /// Pending album references, one per line (default: "./list.txt")
    #[serde(default = "default_pending_file")]
    pub pending_file: PathBuf,

    /// Albums the site reported missing (default: "./list_blocked.txt")
    #[serde(default = "default_blocked_file")]
    pub blocked_file: PathBuf,

    /// Albums downloaded to completion (default: "./list_completed.txt")
    #[serde(default = "default_completed_file")]
    pub completed_file: PathBuf,
}

impl Default for WorklistConfig {
    fn default() -> Self {
        Self {
            pending_file: default_pending_file(),
            blocked_file: default_blocked_file(),
            completed_file: default_completed_file(),
        }
    }
}

/// Main configuration for [`AlbumDownloader`](crate::AlbumDownloader)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base directory albums are downloaded into (default: "./Albums/")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Run link resolution and downloads through worker pools (default: true)
    ///
    /// When disabled, both stages run one item at a time and image pages are
    /// fetched through the session page fetcher.
    #[serde(default = "default_true")]
    pub pooled_execution: bool,

    /// Concurrent image-page fetches when pooled (default: 3)
    #[serde(default = "default_pool_size")]
    pub link_pool_size: usize,

    /// Concurrent image downloads when pooled (default: 3)
    #[serde(default = "default_pool_size")]
    pub download_pool_size: usize,

    /// Site root used to qualify relative image-page links
    #[serde(default = "default_site_base_url")]
    pub site_base_url: String,

    /// Per-request timeout for every HTTP fetch (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Worklist file locations
    #[serde(default)]
    pub worklist: WorklistConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            pooled_execution: true,
            link_pool_size: default_pool_size(),
            download_pool_size: default_pool_size(),
            site_base_url: default_site_base_url(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            worklist: WorklistConfig::default(),
        }
    }
}

/// How a worker stage schedules its items
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One item at a time
    Sequential,
    /// Up to N items in flight
    Pooled(usize),
}

impl ExecutionMode {
    /// Number of items allowed in flight
    pub fn width(&self) -> usize {
        match self {
            ExecutionMode::Sequential => 1,
            ExecutionMode::Pooled(n) => (*n).max(1),
        }
    }
}

impl Config {
    /// Load the config at `path`, creating it with defaults if it does not exist
    pub async fn load_or_create(path: &Path) -> Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let config: Config = serde_json::from_str(&content)?;
                config.validate()?;
                tracing::debug!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Config::default();
                config.save(path).await?;
                tracing::info!(path = %path.display(), "Created default configuration");
                Ok(config)
            }
            Err(e) => Err(Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config '{}': {}", path.display(), e),
            ))),
        }
    }

    /// Write the config to `path` as pretty-printed JSON
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Check values serde cannot enforce
    pub fn validate(&self) -> Result<()> {
        if self.link_pool_size == 0 {
            return Err(Error::Config {
                message: "link_pool_size must be at least 1".into(),
                key: Some("link_pool_size".into()),
            });
        }
        if self.download_pool_size == 0 {
            return Err(Error::Config {
                message: "download_pool_size must be at least 1".into(),
                key: Some("download_pool_size".into()),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(Error::Config {
                message: "request_timeout must be greater than zero".into(),
                key: Some("request_timeout".into()),
            });
        }
        self.base_url()?;
        Ok(())
    }

    /// Parsed [`site_base_url`](Self::site_base_url)
    pub fn base_url(&self) -> Result<url::Url> {
        let base = url::Url::parse(&self.site_base_url).map_err(|e| Error::Config {
            message: format!("site_base_url '{}' is not a URL: {}", self.site_base_url, e),
            key: Some("site_base_url".into()),
        })?;
        if base.cannot_be_a_base() {
            return Err(Error::Config {
                message: format!("site_base_url '{}' cannot be a base URL", self.site_base_url),
                key: Some("site_base_url".into()),
            });
        }
        Ok(base)
    }

    /// Scheduling for the link resolution stage
    pub fn link_mode(&self) -> ExecutionMode {
        if self.pooled_execution {
            ExecutionMode::Pooled(self.link_pool_size)
        } else {
            ExecutionMode::Sequential
        }
    }

    /// Scheduling for the download stage
    pub fn download_mode(&self) -> ExecutionMode {
        if self.pooled_execution {
            ExecutionMode::Pooled(self.download_pool_size)
        } else {
            ExecutionMode::Sequential
        }
    }

    /// Change the output directory; an empty value resets to the working directory
    pub fn set_output_dir(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        self.output_dir = if dir.as_os_str().is_empty() {
            PathBuf::from("./")
        } else {
            dir
        };
    }

    /// Flip pooled execution, returning the new value
    pub fn toggle_pooled_execution(&mut self) -> bool {
        self.pooled_execution = !self.pooled_execution;
        self.pooled_execution
    }

    /// Set both pool widths, rejecting zero
    pub fn set_pool_sizes(&mut self, link_pool_size: usize, download_pool_size: usize) -> Result<()> {
        let mut updated = self.clone();
        updated.link_pool_size = link_pool_size;
        updated.download_pool_size = download_pool_size;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./Albums/")
}

fn default_pool_size() -> usize {
    3
}

fn default_site_base_url() -> String {
    "https://members.luscious.net/".into()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("luscious-dl/", env!("CARGO_PKG_VERSION")).into()
}

fn default_pending_file() -> PathBuf {
    PathBuf::from("./list.txt")
}

fn default_blocked_file() -> PathBuf {
    PathBuf::from("./list_blocked.txt")
}

fn default_completed_file() -> PathBuf {
    PathBuf::from("./list_completed.txt")
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
