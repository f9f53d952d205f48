use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "RENTAL_HUB";

/// Runtime settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the file-backed store
    pub data_dir: PathBuf,
    /// Key of the shared blob (listings, likes, notifications)
    pub shared_key: String,
    /// Key of the per-context session record
    pub session_key: String,
    /// Simulated latency of the password-reset call
    pub reset_delay_ms: u64,
    /// How often the file store looks for changes from other processes
    pub poll_interval_ms: u64,
    /// Default tracing filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            shared_key: "smartHomeData".to_string(),
            session_key: "smartHomeUser".to_string(),
            reset_delay_ms: 800,
            poll_interval_ms: 500,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then the file at `path` if it exists, then `RENTAL_HUB_*` variables
    pub fn load(path: &Path) -> Result<Self> {
        let defaults = Config::default();
        let mut builder = ::config::Config::builder()
            .set_default("data_dir", defaults.data_dir.to_string_lossy().to_string())?
            .set_default("shared_key", defaults.shared_key)?
            .set_default("session_key", defaults.session_key)?
            .set_default("reset_delay_ms", defaults.reset_delay_ms as i64)?
            .set_default("poll_interval_ms", defaults.poll_interval_ms as i64)?
            .set_default("log_level", defaults.log_level)?;

        // Optional file
        if path.exists() {
            builder = builder.add_source(::config::File::from(path));
        }

        // Environment overrides: RENTAL_HUB_DATA_DIR=/var/lib/rentals, etc.
        builder = builder.add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize::<Config>())
            .with_context(|| format!("Failed to load config {}", path.display()))
    }

    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_use_the_browser_keys() {
        let config = Config::default();
        assert_eq!(config.shared_key, "smartHomeData");
        assert_eq!(config.session_key, "smartHomeUser");
        assert_eq!(config.reset_delay(), Duration::from_millis(800));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(&temp_dir.path().join("nonexistent.toml")).unwrap();

        assert_eq!(config.shared_key, "smartHomeData");
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rental-hub.toml");
        fs::write(&path, "data_dir = \"/tmp/rentals\"\npoll_interval_ms = 50\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/rentals"));
        assert_eq!(config.poll_interval(), Duration::from_millis(50));
        assert_eq!(config.shared_key, "smartHomeData");
    }

    #[test]
    fn environment_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rental-hub.json");
        fs::write(&path, r#"{"session_key": "fromFile", "reset_delay_ms": 5}"#).unwrap();

        env::set_var("RENTAL_HUB_SESSION_KEY", "tabUser");
        env::set_var("RENTAL_HUB_RESET_DELAY_MS", "10");
        let config = Config::load(&path);
        env::remove_var("RENTAL_HUB_SESSION_KEY");
        env::remove_var("RENTAL_HUB_RESET_DELAY_MS");

        let config = config.unwrap();
        assert_eq!(config.session_key, "tabUser");
        assert_eq!(config.reset_delay_ms, 10);
    }

    #[test]
    fn non_numeric_interval_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rental-hub.toml");
        fs::write(&path, "poll_interval_ms = \"soon\"\n").unwrap();

        assert!(Config::load(&path).is_err());
    }
}
