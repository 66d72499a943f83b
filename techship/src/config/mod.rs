//! Configuration file handling.
//!
//! Settings live in an INI file at `<config dir>/techship/config.ini`.
//! Every key has a built-in default so a missing file or section still
//! yields a working configuration; the TechTrack credentials can
//! additionally be overridden through environment variables, which win over
//! the file (deployments keep secrets out of the file that way).
//!
//! ```ini
//! [techtrack]
//! base_url = https://18wheels.techtrack.cloud/api/v2/event/get-by-tracking-numbers
//! user_key = ...
//! api_key = ...
//!
//! [tracking]
//! timeout_secs = 15
//! min_interval_ms = 50
//! retry_wait_secs = 1
//! cache_capacity = 1000
//!
//! [database]
//! master_path = master_database.csv
//! max_rows = 30000
//!
//! [clients]
//! BS04 = bs04ts
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::auth::ClientPins;
use crate::tracking::ApiConfig;

/// Environment variables that override the `[techtrack]` section.
pub const ENV_BASE_URL: &str = "TECHTRACK_BASE_URL";
pub const ENV_USER_KEY: &str = "TECHTRACK_USER_KEY";
pub const ENV_API_KEY: &str = "TECHTRACK_API_KEY";

/// Errors from configuration handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(String),

    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// TechTrack API credentials and endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechTrackSection {
    pub base_url: String,
    pub user_key: String,
    pub api_key: String,
}

impl Default for TechTrackSection {
    fn default() -> Self {
        let defaults = ApiConfig::default();
        Self {
            base_url: defaults.base_url,
            user_key: defaults.user_key,
            api_key: defaults.api_key,
        }
    }
}

/// Tuning knobs for the lookup client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingSection {
    pub timeout_secs: u64,
    pub min_interval_ms: u64,
    pub retry_wait_secs: u64,
    pub cache_capacity: u64,
}

impl Default for TrackingSection {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            min_interval_ms: 50,
            retry_wait_secs: 1,
            cache_capacity: 1000,
        }
    }
}

/// Master database location and row cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSection {
    pub master_path: PathBuf,
    pub max_rows: usize,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            master_path: PathBuf::from("master_database.csv"),
            max_rows: 30_000,
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub techtrack: TechTrackSection,
    pub tracking: TrackingSection,
    pub database: DatabaseSection,
    pub clients: ClientPins,
}

impl ConfigFile {
    /// Load from the default path, then apply environment overrides.
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from a specific file, without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = ini.get_from(Some("techtrack"), "base_url") {
            config.techtrack.base_url = value.to_string();
        }
        if let Some(value) = ini.get_from(Some("techtrack"), "user_key") {
            config.techtrack.user_key = value.to_string();
        }
        if let Some(value) = ini.get_from(Some("techtrack"), "api_key") {
            config.techtrack.api_key = value.to_string();
        }

        config.tracking.timeout_secs =
            parse_key(ini, "tracking", "timeout_secs", config.tracking.timeout_secs)?;
        config.tracking.min_interval_ms =
            parse_key(ini, "tracking", "min_interval_ms", config.tracking.min_interval_ms)?;
        config.tracking.retry_wait_secs =
            parse_key(ini, "tracking", "retry_wait_secs", config.tracking.retry_wait_secs)?;
        config.tracking.cache_capacity =
            parse_key(ini, "tracking", "cache_capacity", config.tracking.cache_capacity)?;

        if let Some(value) = ini.get_from(Some("database"), "master_path") {
            config.database.master_path = PathBuf::from(value);
        }
        config.database.max_rows =
            parse_key(ini, "database", "max_rows", config.database.max_rows)?;

        if let Some(section) = ini.section(Some("clients")) {
            let pins: Vec<(String, String)> = section
                .iter()
                .map(|(code, pin)| (code.to_string(), pin.to_string()))
                .collect();
            if !pins.is_empty() {
                config.clients = ClientPins::new(pins);
            }
        }

        Ok(config)
    }

    /// Credentials from the environment win over the file.
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var(ENV_BASE_URL) {
            self.techtrack.base_url = value;
        }
        if let Ok(value) = std::env::var(ENV_USER_KEY) {
            self.techtrack.user_key = value;
        }
        if let Ok(value) = std::env::var(ENV_API_KEY) {
            self.techtrack.api_key = value;
        }
    }

    /// Save to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut ini = Ini::new();
        ini.with_section(Some("techtrack"))
            .set("base_url", self.techtrack.base_url.as_str())
            .set("user_key", self.techtrack.user_key.as_str())
            .set("api_key", self.techtrack.api_key.as_str());
        ini.with_section(Some("tracking"))
            .set("timeout_secs", self.tracking.timeout_secs.to_string())
            .set("min_interval_ms", self.tracking.min_interval_ms.to_string())
            .set("retry_wait_secs", self.tracking.retry_wait_secs.to_string())
            .set("cache_capacity", self.tracking.cache_capacity.to_string());
        ini.with_section(Some("database"))
            .set("master_path", self.database.master_path.display().to_string())
            .set("max_rows", self.database.max_rows.to_string());
        {
            let mut clients = ini.with_section(Some("clients"));
            for (code, pin) in self.clients.entries() {
                clients.set(code, pin);
            }
        }

        ini.write_to_file(path)?;
        Ok(())
    }

    /// Connection settings for [`crate::tracking::TrackingClient`].
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.techtrack.base_url.clone(),
            user_key: self.techtrack.user_key.clone(),
            api_key: self.techtrack.api_key.clone(),
            timeout: Duration::from_secs(self.tracking.timeout_secs),
            min_interval: Duration::from_millis(self.tracking.min_interval_ms),
            retry_wait: Duration::from_secs(self.tracking.retry_wait_secs),
            cache_capacity: self.tracking.cache_capacity,
            ..ApiConfig::default()
        }
    }
}

fn parse_key<T: FromStr>(ini: &Ini, section: &str, key: &str, default: T) -> Result<T, ConfigError> {
    match ini.get_from(Some(section), key) {
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
            key: format!("{}.{}", section, key),
            value: value.to_string(),
        }),
        None => Ok(default),
    }
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("techship")
        .join("config.ini")
}

/// Addressable configuration keys for `techship config get/set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    TechtrackBaseUrl,
    TechtrackUserKey,
    TechtrackApiKey,
    TrackingTimeoutSecs,
    TrackingMinIntervalMs,
    TrackingRetryWaitSecs,
    TrackingCacheCapacity,
    DatabaseMasterPath,
    DatabaseMaxRows,
}

impl ConfigKey {
    /// All addressable keys, for `config list`.
    pub const ALL: &'static [ConfigKey] = &[
        ConfigKey::TechtrackBaseUrl,
        ConfigKey::TechtrackUserKey,
        ConfigKey::TechtrackApiKey,
        ConfigKey::TrackingTimeoutSecs,
        ConfigKey::TrackingMinIntervalMs,
        ConfigKey::TrackingRetryWaitSecs,
        ConfigKey::TrackingCacheCapacity,
        ConfigKey::DatabaseMasterPath,
        ConfigKey::DatabaseMaxRows,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::TechtrackBaseUrl => "techtrack.base_url",
            ConfigKey::TechtrackUserKey => "techtrack.user_key",
            ConfigKey::TechtrackApiKey => "techtrack.api_key",
            ConfigKey::TrackingTimeoutSecs => "tracking.timeout_secs",
            ConfigKey::TrackingMinIntervalMs => "tracking.min_interval_ms",
            ConfigKey::TrackingRetryWaitSecs => "tracking.retry_wait_secs",
            ConfigKey::TrackingCacheCapacity => "tracking.cache_capacity",
            ConfigKey::DatabaseMasterPath => "database.master_path",
            ConfigKey::DatabaseMaxRows => "database.max_rows",
        }
    }

    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::TechtrackBaseUrl => config.techtrack.base_url.clone(),
            ConfigKey::TechtrackUserKey => config.techtrack.user_key.clone(),
            ConfigKey::TechtrackApiKey => config.techtrack.api_key.clone(),
            ConfigKey::TrackingTimeoutSecs => config.tracking.timeout_secs.to_string(),
            ConfigKey::TrackingMinIntervalMs => config.tracking.min_interval_ms.to_string(),
            ConfigKey::TrackingRetryWaitSecs => config.tracking.retry_wait_secs.to_string(),
            ConfigKey::TrackingCacheCapacity => config.tracking.cache_capacity.to_string(),
            ConfigKey::DatabaseMasterPath => config.database.master_path.display().to_string(),
            ConfigKey::DatabaseMaxRows => config.database.max_rows.to_string(),
        }
    }

    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: self.name().to_string(),
            value: value.to_string(),
        };
        match self {
            ConfigKey::TechtrackBaseUrl => config.techtrack.base_url = value.to_string(),
            ConfigKey::TechtrackUserKey => config.techtrack.user_key = value.to_string(),
            ConfigKey::TechtrackApiKey => config.techtrack.api_key = value.to_string(),
            ConfigKey::TrackingTimeoutSecs => {
                config.tracking.timeout_secs = value.parse().map_err(|_| invalid())?
            }
            ConfigKey::TrackingMinIntervalMs => {
                config.tracking.min_interval_ms = value.parse().map_err(|_| invalid())?
            }
            ConfigKey::TrackingRetryWaitSecs => {
                config.tracking.retry_wait_secs = value.parse().map_err(|_| invalid())?
            }
            ConfigKey::TrackingCacheCapacity => {
                config.tracking.cache_capacity = value.parse().map_err(|_| invalid())?
            }
            ConfigKey::DatabaseMasterPath => {
                config.database.master_path = PathBuf::from(value)
            }
            ConfigKey::DatabaseMaxRows => {
                config.database.max_rows = value.parse().map_err(|_| invalid())?
            }
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .iter()
            .find(|key| key.name() == s)
            .copied()
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
