//! Configuration loading for the Anuario TUI.
//!
//! All fields are required unless explicitly marked optional. No defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuiConfig {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    /// Timeout for the collection fetch, which may hit a cold database.
    pub list_timeout_ms: u64,
    pub refresh_interval_ms: u64,
    pub persistence_path: PathBuf,
    pub log_path: PathBuf,
    pub log_filter: String,
    pub sync: SyncConfig,
    pub tasks: TaskConfig,
    pub auth: AuthConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    pub poll_interval_ms: u64,
    /// Consecutive missing image-sync statuses tolerated before the poll
    /// loop gives up.
    pub max_missed_status: u32,
    pub sync_on_startup: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    pub max_concurrent: usize,
}

/// Optional credentials used to open a session at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or ANUARIO_TUI_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl TuiConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: TuiConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(invalid("api_base_url", "must not be empty"));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(invalid("api_base_url", "must start with http:// or https://"));
        }
        if self.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms", "must be > 0"));
        }
        if self.list_timeout_ms == 0 {
            return Err(invalid("list_timeout_ms", "must be > 0"));
        }
        if self.refresh_interval_ms == 0 {
            return Err(invalid("refresh_interval_ms", "must be > 0"));
        }
        if self.persistence_path.as_os_str().is_empty() {
            return Err(invalid("persistence_path", "must not be empty"));
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(invalid("log_path", "must not be empty"));
        }
        if self.log_filter.trim().is_empty() {
            return Err(invalid("log_filter", "must not be empty"));
        }
        if self.sync.poll_interval_ms == 0 {
            return Err(invalid("sync.poll_interval_ms", "must be > 0"));
        }
        if self.sync.max_missed_status == 0 {
            return Err(invalid("sync.max_missed_status", "must be > 0"));
        }
        if self.tasks.max_concurrent == 0 {
            return Err(invalid("tasks.max_concurrent", "must be > 0"));
        }
        if self.auth.username.is_some() != self.auth.password.is_some() {
            return Err(invalid("auth", "username and password must be provided together"));
        }
        if self.theme.name.trim().is_empty() {
            return Err(invalid("theme.name", "must not be empty"));
        }
        if self.theme.name.to_ascii_lowercase() != "hogwarts" {
            return Err(invalid("theme.name", "only 'hogwarts' is supported"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn list_timeout(&self) -> Duration {
        Duration::from_millis(self.list_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.sync.poll_interval_ms)
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("ANUARIO_TUI_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
api_base_url = "http://localhost:8000"
request_timeout_ms = 10000
list_timeout_ms = 120000
refresh_interval_ms = 250
persistence_path = "tmp/anuario-state.json"
log_path = "tmp/anuario.log"
log_filter = "info"

[sync]
poll_interval_ms = 1000
max_missed_status = 5
sync_on_startup = true

[tasks]
max_concurrent = 4

[auth]

[theme]
name = "hogwarts"
"#;

    #[test]
    fn test_sample_config_parses_and_validates() {
        let config = TuiConfig::from_toml(SAMPLE).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.list_timeout(), Duration::from_secs(120));
        assert_eq!(config.sync.max_missed_status, 5);
        assert!(config.auth.username.is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = SAMPLE.replace("[sync]", "bogus = true\n\n[sync]");
        assert!(matches!(TuiConfig::from_toml(&toml), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_section_rejected() {
        let toml = SAMPLE.replace("[tasks]\nmax_concurrent = 4\n", "");
        assert!(TuiConfig::from_toml(&toml).is_err());
    }
}
