//! Configuration management.
//!
//! A [`Config`] is built once at startup and passed by reference into every
//! component. Nothing reads global mode flags.
//!
//! # Configuration File Format
//!
//! ```toml
//! mode = "normal"            # normal | offline | fetch_only
//!
//! [pagination]
//! page_size = 100
//! max_pages = 50
//! max_block_retries = 3
//! block_backoff_base_secs = 10.0
//! request_timeout_secs = 15
//! page_delay = { mean_secs = 7.5, spread_secs = 4.5 }
//!
//! [batch]
//! profile_delay = { mean_secs = 8.5, spread_secs = 3.5 }
//! resume_pause_secs = 5.0
//!
//! [paths]
//! cache_dir = "./html"
//! cache_pages = true
//! venue_list = "./venues.txt"
//! checkpoint = "./scholar-tally.checkpoint.toml"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every key can be overridden from the environment with the
//! `SCHOLAR_TALLY_` prefix and `__` between sections, e.g.
//! `SCHOLAR_TALLY_PAGINATION__MAX_BLOCK_RETRIES=5`.

mod inputs;

pub use inputs::{load_candidates, load_venue_list};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::JitteredDelay;

const ENV_PREFIX: &str = "SCHOLAR_TALLY";
const CONFIG_FILE_NAME: &str = "scholar-tally.toml";

/// Browser-like user agent; the default client string is refused outright.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// What a run does with each profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Fetch, cache and tally
    #[default]
    Normal,
    /// Tally previously cached pages without network access
    Offline,
    /// Fetch and cache pages without tallying
    FetchOnly,
}

impl RunMode {
    pub fn uses_network(&self) -> bool {
        !matches!(self, RunMode::Offline)
    }

    pub fn produces_records(&self) -> bool {
        !matches!(self, RunMode::FetchOnly)
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mode: RunMode,

    #[serde(default)]
    pub pagination: PaginationConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }
}

/// A randomized wait described by its mean and half-width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayConfig {
    pub mean_secs: f64,
    #[serde(default)]
    pub spread_secs: f64,
}

impl DelayConfig {
    pub const NONE: DelayConfig = DelayConfig {
        mean_secs: 0.0,
        spread_secs: 0.0,
    };

    pub fn jittered(&self) -> JitteredDelay {
        JitteredDelay::new(
            Duration::from_secs_f64(self.mean_secs.max(0.0)),
            Duration::from_secs_f64(self.spread_secs.max(0.0)),
        )
    }
}

/// Per-profile pagination and anti-block policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Rows requested per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Hard cap on pages per profile
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Retries allowed for one page after a block or transport failure
    #[serde(default = "default_max_block_retries")]
    pub max_block_retries: u32,

    /// First backoff; doubles with each further attempt
    #[serde(default = "default_backoff_base")]
    pub block_backoff_base_secs: f64,

    /// Wait between successful pages
    #[serde(default = "default_page_delay")]
    pub page_delay: DelayConfig,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            max_block_retries: default_max_block_retries(),
            block_backoff_base_secs: default_backoff_base(),
            page_delay: default_page_delay(),
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl PaginationConfig {
    pub fn backoff_base(&self) -> Duration {
        Duration::from_secs_f64(self.block_backoff_base_secs.max(0.0))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Same policy with no waits, for reading cached pages
    pub fn unpaced(&self) -> Self {
        Self {
            page_delay: DelayConfig::NONE,
            block_backoff_base_secs: 0.0,
            ..self.clone()
        }
    }
}

fn default_page_size() -> usize {
    100
}

fn default_max_pages() -> usize {
    50
}

fn default_max_block_retries() -> u32 {
    3
}

fn default_backoff_base() -> f64 {
    10.0
}

fn default_page_delay() -> DelayConfig {
    DelayConfig {
        mean_secs: 7.5,
        spread_secs: 4.5,
    }
}

fn default_request_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Batch-level pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Wait between candidates
    #[serde(default = "default_profile_delay")]
    pub profile_delay: DelayConfig,

    /// Pause after the operator chooses to continue past a suspected block
    #[serde(default = "default_resume_pause")]
    pub resume_pause_secs: f64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            profile_delay: default_profile_delay(),
            resume_pause_secs: default_resume_pause(),
        }
    }
}

impl BatchConfig {
    pub fn resume_pause(&self) -> Duration {
        Duration::from_secs_f64(self.resume_pause_secs.max(0.0))
    }
}

fn default_profile_delay() -> DelayConfig {
    DelayConfig {
        mean_secs: 8.5,
        spread_secs: 3.5,
    }
}

fn default_resume_pause() -> f64 {
    5.0
}

/// Filesystem locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory for cached page bodies
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Whether normal runs keep a copy of every fetched page
    #[serde(default = "default_true")]
    pub cache_pages: bool,

    /// Venue allow-list used when none is given on the command line
    #[serde(default)]
    pub venue_list: Option<PathBuf>,

    /// Resume checkpoint written after every candidate
    #[serde(default = "default_checkpoint")]
    pub checkpoint: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            cache_pages: true,
            venue_list: None,
            checkpoint: default_checkpoint(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./html")
}

fn default_checkpoint() -> PathBuf {
    PathBuf::from("./scholar-tally.checkpoint.toml")
}

fn default_true() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "json" for structured output, anything else for plain text
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration and input-file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Load configuration from an optional file plus `SCHOLAR_TALLY_*` variables
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Find a config file in the working directory or the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    let user = dirs::config_dir()?.join("scholar-tally").join("config.toml");
    user.is_file().then_some(user)
}
