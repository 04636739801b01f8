use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    core::utils::{app_data_dir, config_file_in, write_atomic},
    errors::ConfigError,
    format::DEFAULT_DATE_FORMAT,
    storage::{RetryPolicy, DEFAULT_STORAGE_KEY},
};

/// User-facing preferences and storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "Config::default_date_format")]
    pub date_format: String,
    /// Category names offered to the user. Stored transactions are not checked against it.
    #[serde(default = "Config::default_categories")]
    pub categories: Vec<String>,
    #[serde(default = "Config::default_storage_key")]
    pub storage_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom data directory. Defaults to `EXPENSE_CORE_HOME` or `~/.expense_core`.
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub persistence: PersistenceSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_symbol: Self::default_currency_symbol(),
            date_format: Self::default_date_format(),
            categories: Self::default_categories(),
            storage_key: Self::default_storage_key(),
            data_dir: None,
            persistence: PersistenceSettings::default(),
        }
    }
}

impl Config {
    pub fn default_currency_symbol() -> String {
        "$".into()
    }

    pub fn default_date_format() -> String {
        DEFAULT_DATE_FORMAT.into()
    }

    pub fn default_storage_key() -> String {
        DEFAULT_STORAGE_KEY.into()
    }

    pub fn default_categories() -> Vec<String> {
        [
            "Food",
            "Transport",
            "Shopping",
            "Bills",
            "Entertainment",
            "Health",
            "Salary",
            "Other",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(app_data_dir)
    }
}

/// Write retry and load recovery behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceSettings {
    #[serde(default = "PersistenceSettings::default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "PersistenceSettings::default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Start with an empty ledger instead of failing when the stored value is unreadable.
    #[serde(default = "PersistenceSettings::default_recover_corrupt")]
    pub recover_corrupt: bool,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            max_attempts: Self::default_max_attempts(),
            retry_backoff_ms: Self::default_retry_backoff_ms(),
            recover_corrupt: Self::default_recover_corrupt(),
        }
    }
}

impl PersistenceSettings {
    pub fn default_max_attempts() -> u32 {
        3
    }

    pub fn default_retry_backoff_ms() -> u64 {
        25
    }

    pub fn default_recover_corrupt() -> bool {
        true
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

/// Loads and saves [`Config`] as JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Self {
        Self {
            path: config_file_in(&base),
        }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Reads the config file, falling back to defaults when it does not exist.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
