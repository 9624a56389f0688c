use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str =
    "https://api.bing.microsoft.com/v7.0/spellcheck?mode=proof&mkt=en-US";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,

    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Oracle credential. Never written back to disk by the tool; supplied
    /// via config file, environment, or CLI flag.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_workers() -> usize {
    3
}

fn default_throttle_ms() -> u64 {
    1000
}

fn default_retry_limit() -> u32 {
    2
}

fn default_backoff_ms() -> u64 {
    250
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_color() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            throttle_ms: default_throttle_ms(),
            retry_limit: default_retry_limit(),
            backoff_ms: default_backoff_ms(),
            timeout_ms: default_timeout_ms(),
            api_url: default_api_url(),
            api_key: None,
            color: default_color(),
        }
    }
}

/// Values taken from the command line, applied last.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub workers: Option<usize>,
    pub throttle_ms: Option<u64>,
    pub retry_limit: Option<u32>,
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub no_color: bool,
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global_config = Self::from_file(&global_path)?;
                config = config.merge(global_config);
            }
        }

        // Load local config (overrides global)
        let local_path = PathBuf::from(".spellsweep.toml");
        if local_path.exists() {
            let local_config = Self::from_file(&local_path)?;
            config = config.merge(local_config);
        }

        config.apply_overrides(overrides);
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        // Merge logic: other's values override self's if they differ from defaults
        if other.workers != default_workers() {
            self.workers = other.workers;
        }
        if other.throttle_ms != default_throttle_ms() {
            self.throttle_ms = other.throttle_ms;
        }
        if other.retry_limit != default_retry_limit() {
            self.retry_limit = other.retry_limit;
        }
        if other.backoff_ms != default_backoff_ms() {
            self.backoff_ms = other.backoff_ms;
        }
        if other.timeout_ms != default_timeout_ms() {
            self.timeout_ms = other.timeout_ms;
        }
        if other.api_url != default_api_url() {
            self.api_url = other.api_url;
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        self.color = other.color;
        self
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(workers) = overrides.workers {
            self.workers = workers;
        }
        if let Some(throttle_ms) = overrides.throttle_ms {
            self.throttle_ms = throttle_ms;
        }
        if let Some(retry_limit) = overrides.retry_limit {
            self.retry_limit = retry_limit;
        }
        if let Some(api_key) = overrides.api_key {
            self.api_key = Some(api_key);
        }
        if let Some(api_url) = overrides.api_url {
            self.api_url = api_url;
        }
        if overrides.no_color {
            self.color = false;
        }
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spellsweep").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
