//! Configuration loading and the on-disk state directory.
//!
//! Precedence, highest first:
//! 1. `--config <path>` on the command line
//! 2. `DOMOCTL_CONFIG` environment variable (path to a TOML file)
//! 3. `<state dir>/config.toml` when it exists
//! 4. Compiled defaults
//!
//! `DOMOCTL_API_URL` overrides `api_url` from any of the above. The state
//! directory itself is `DOMOCTL_HOME`, falling back to `~/.config/domoctl`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP client tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// TCP connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds, connect included.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter: "error", "warn", "info", "debug", "trace".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Backend base URL, e.g. `https://home.example.net/api`.
    /// Optional: commands that talk to the backend fail without it.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads configuration with the documented precedence and applies
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Config, String> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("DOMOCTL_CONFIG").ok().map(PathBuf::from));

        let mut config = if let Some(p) = explicit {
            Self::from_file(&p)?
        } else {
            let fallback = state_dir().join("config.toml");
            if fallback.exists() {
                Self::from_file(&fallback)?
            } else {
                Config::default()
            }
        };

        // Env var overrides
        if let Ok(url) = std::env::var("DOMOCTL_API_URL") {
            if !url.is_empty() {
                config.api_url = Some(url);
            }
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Config, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config file {}: {e}", path.display()))?;
        toml::from_str(&content)
            .map_err(|e| format!("failed to parse config file {}: {e}", path.display()))
    }
}

/// The directory holding tokens, session state, and the default config file.
///
/// `DOMOCTL_HOME` when set and non-empty, else `~/.config/domoctl`.
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DOMOCTL_HOME") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".config").join("domoctl"))
        .unwrap_or_else(|| PathBuf::from(".domoctl"))
}
