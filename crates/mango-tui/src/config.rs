//! Configuration file handling.
//!
//! Reads from `~/.config/password-mango/mango.toml`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Environment variable overriding the server URL.
pub const SERVER_URL_ENV: &str = "MANGO_SERVER_URL";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the credential server.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Request timeout in seconds. `0` waits forever.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Log file; defaults to `mango.log` in the cache directory.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_server_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            request_timeout_secs: default_request_timeout_secs(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from the config file.
    ///
    /// If `custom_path` is provided, load from that path.
    /// Otherwise, load from the default XDG config location.
    /// Creates a default config file if it doesn't exist (only for default path).
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self> {
        let is_custom = custom_path.is_some();
        let config_path = match custom_path {
            Some(path) => path,
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            if !is_custom {
                let config = Config::default();
                config.save()?;
                tracing::info!("Created default config: {:?}", config);
                return Ok(config);
            } else {
                anyhow::bail!("Config file not found: {}", config_path.display());
            }
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        tracing::info!("Loaded config from {}: {:?}", config_path.display(), config);
        Ok(config)
    }

    /// Save configuration to the config file.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))
    }

    /// Layer overrides on top of the file values.
    ///
    /// CLI values win over the environment, which wins over the file.
    pub fn apply_overrides(
        &mut self,
        env_server_url: Option<String>,
        cli_server_url: Option<String>,
        cli_timeout_secs: Option<u64>,
    ) {
        if let Some(url) = cli_server_url.or(env_server_url) {
            let url = url.trim().to_string();
            if !url.is_empty() {
                self.server_url = url;
            }
        }
        if let Some(secs) = cli_timeout_secs {
            self.request_timeout_secs = secs;
        }
    }

    /// The server URL, validated as an absolute http(s) URL.
    pub fn server_url(&self) -> Result<Url> {
        let url = Url::parse(&self.server_url)
            .with_context(|| format!("Invalid server URL: {}", self.server_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("Server URL must use http or https: {}", self.server_url);
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Where logs go: the configured file, else `mango.log` in the user
    /// cache directory. `None` only when no cache directory exists.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file.clone().or_else(|| {
            dirs::cache_dir().map(|dir| dir.join("password-mango").join("mango.log"))
        })
    }

    /// Get the path to the config file.
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("password-mango").join("mango.toml"))
    }
}
