//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/gymflow/config.toml)
//! 3. Environment variables (GYMFLOW_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix
const ENV_PREFIX: &str = "GYMFLOW";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for local state (offline queue, session)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Base URL of the Graha Fitness backend
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Interval between connectivity probes in seconds
    #[serde(default = "default_probe_interval")]
    pub probe_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            server_url: default_server_url(),
            request_timeout_secs: default_request_timeout(),
            probe_interval_secs: default_probe_interval(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (GYMFLOW_DATA_DIR, GYMFLOW_SERVER_URL)
    /// 2. Config file (~/.config/gymflow/config.toml or GYMFLOW_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // GYMFLOW_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // GYMFLOW_SERVER_URL
        if let Ok(val) = std::env::var(format!("{}_SERVER_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.server_url = val;
            }
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_file_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with GYMFLOW_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gymflow")
            .join("config.toml")
    }

    /// Get the path of the persisted offline queue
    pub fn queue_path(&self) -> PathBuf {
        self.data_dir.join("queue.json")
    }

    /// Get the path of the persisted login session
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gymflow")
}

fn default_server_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_probe_interval() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap();
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            // Clear all the vars
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &["GYMFLOW_DATA_DIR", "GYMFLOW_SERVER_URL", "GYMFLOW_CONFIG"];

    #[test]
    fn test_default_config() {
        let _guard = EnvGuard::new(ENV_VARS);
        let config = Config::default();
        assert_eq!(config.server_url, "http://localhost:8000");
        assert_eq!(config.request_timeout_secs, 60);
        assert!(config.data_dir.ends_with("gymflow"));
    }

    #[test]
    fn test_file_paths() {
        let _guard = EnvGuard::new(ENV_VARS);
        let config = Config::default();

        assert!(config.queue_path().ends_with("queue.json"));
        assert!(config.session_path().ends_with("session.json"));
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);
        let config = Config::load_from_str(
            r#"
            server_url = "http://gym.example.com"
            request_timeout_secs = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.server_url, "http://gym.example.com");
        assert_eq!(config.request_timeout_secs, 10);
        // Unspecified fields fall back to defaults
        assert_eq!(config.probe_interval_secs, 5);
    }

    #[test]
    fn test_env_overrides() {
        let _guard = EnvGuard::new(ENV_VARS);
        env::set_var("GYMFLOW_SERVER_URL", "http://override:9000");

        let config = Config::load_from_str("server_url = \"http://file:8000\"").unwrap();
        assert_eq!(config.server_url, "http://override:9000");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let _guard = EnvGuard::new(ENV_VARS);
        let dir = tempfile::tempdir().unwrap();
        env::set_var("GYMFLOW_DATA_DIR", dir.path().join("data"));

        let config = Config::load_from_path(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.server_url, "http://localhost:8000");
        // Data dir is created on load
        assert!(config.data_dir.exists());
    }
}
