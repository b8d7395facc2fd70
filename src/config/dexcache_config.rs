//! dexcache configuration file handling
//!
//! Loads and manages the ~/.config/dexcache/config.yaml file.

use crate::population::RetryPolicy;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upstream catalog settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Catalog API root; the index lives at `{base_url}/pokemon`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Page size requested for the bulk index (large enough for the whole catalog)
    #[serde(default = "default_index_limit")]
    pub index_limit: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// User-Agent header sent upstream
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://pokeapi.co/api/v2".to_string()
}

fn default_index_limit() -> u32 {
    2000
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("dexcache/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            index_limit: default_index_limit(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Population worker settings
///
/// The defaults requeue a failed request immediately and forever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Retries allowed per request before it is dropped (unset = retry forever)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    /// Delay before the first requeue in milliseconds (0 = requeue immediately)
    #[serde(default)]
    pub initial_backoff_ms: u64,

    /// Upper bound on the requeue delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Backoff multiplier between attempts
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Add up to 25% random jitter to each delay
    #[serde(default)]
    pub jitter: bool,

    /// Capacity of the population event broadcast channel
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_event_channel_capacity() -> usize {
    1024
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            max_retries: None,
            initial_backoff_ms: 0,
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
            jitter: false,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

impl PopulationConfig {
    /// Retry policy described by this section
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            multiplier: self.multiplier,
            jitter: self.jitter,
        }
    }
}

/// dexcache configuration
///
/// Represents the complete ~/.config/dexcache/config.yaml file. Every field
/// has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DexCacheConfig {
    /// Upstream catalog settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Population worker settings
    #[serde(default)]
    pub population: PopulationConfig,
}

impl DexCacheConfig {
    /// Create a configuration with every default
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the default path, falling back to defaults when no file exists
    pub fn load_or_default() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::DexCacheError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading dexcache configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&content)?
        };

        tracing::debug!(
            base_url = %config.upstream.base_url,
            max_retries = ?config.population.max_retries,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Saving dexcache configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Get the default config path (~/.config/dexcache/config.yaml)
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("dexcache");
        path.push("config.yaml");
        path
    }
}
