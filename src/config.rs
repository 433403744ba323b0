//! Configuration loading, validation, and logging setup.
//!
//! Configuration comes from a TOML file; the webhook URL can be overridden
//! with the `RESTOCKD_WEBHOOK_URL` environment variable so the endpoint
//! never has to live in the config file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};
use crate::monitor::MonitorConfig;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub monitor: MonitorSection,
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub webhook: WebhookSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    /// Seconds between check cycles.
    pub interval_secs: u64,
    /// Milliseconds between consecutive product checks within a cycle.
    pub pacing_ms: u64,
    /// Snapshot fetch timeout in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            pacing_ms: 1000,
            fetch_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Path of the JSON registry mirror. Unset runs in-memory only.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookSection {
    /// Webhook endpoint. Unset means alerts are logged only.
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;

        let mut config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.apply_env();
        config.validate()?;

        Ok(config)
    }

    /// Like [`Config::load`], but a missing file falls back to defaults.
    /// Environment overrides still apply.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            let mut config = Config::default();
            config.apply_env();
            config.validate()?;
            Ok(config)
        }
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("RESTOCKD_WEBHOOK_URL") {
            if !url.is_empty() {
                self.webhook.url = Some(url);
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.monitor.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "monitor.interval_secs",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if self.monitor.fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "monitor.fetch_timeout_secs",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if let Some(url) = &self.webhook.url {
            url::Url::parse(url).map_err(|e| ConfigError::InvalidValue {
                field: "webhook.url",
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            poll_interval: Duration::from_secs(self.monitor.interval_secs),
            pacing_delay: Duration::from_millis(self.monitor.pacing_ms),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.monitor.fetch_timeout_secs)
    }

    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize tests that modify environment variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.monitor.interval_secs, 60);
        assert_eq!(config.monitor.pacing_ms, 1000);
        assert_eq!(config.monitor.fetch_timeout_secs, 30);
        assert!(config.store.path.is_none());
        assert!(config.webhook.url.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [monitor]
            interval_secs = 120
            pacing_ms = 500

            [store]
            path = "data/products.json"

            [webhook]
            url = "https://hooks.example/abc"

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.monitor.interval_secs, 120);
        assert_eq!(config.monitor.pacing_ms, 500);
        // Omitted keys in a present section keep their defaults.
        assert_eq!(config.monitor.fetch_timeout_secs, 30);
        assert_eq!(config.store.path, Some(PathBuf::from("data/products.json")));
        assert_eq!(config.webhook.url.as_deref(), Some("https://hooks.example/abc"));
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config: Config = toml::from_str("[monitor]\ninterval_secs = 0").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_webhook_url_rejected() {
        let config: Config = toml::from_str("[webhook]\nurl = \"not a url\"").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides_webhook_url() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("RESTOCKD_WEBHOOK_URL", "https://hooks.example/from-env");

        let mut config = Config::default();
        config.apply_env();
        assert_eq!(
            config.webhook.url.as_deref(),
            Some("https://hooks.example/from-env")
        );

        std::env::remove_var("RESTOCKD_WEBHOOK_URL");
    }

    #[test]
    fn test_empty_env_override_is_ignored() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("RESTOCKD_WEBHOOK_URL", "");

        let mut config = Config::default();
        config.apply_env();
        assert!(config.webhook.url.is_none());

        std::env::remove_var("RESTOCKD_WEBHOOK_URL");
    }

    #[test]
    fn test_load_or_default_with_missing_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("RESTOCKD_WEBHOOK_URL");

        let config = Config::load_or_default("/nonexistent/restockd.toml").unwrap();
        assert_eq!(config.monitor.interval_secs, 60);
    }
}
