//! Configuration for dormant.

use chrono::NaiveDate;
use config::{Config as ConfigLoader, Environment, File};
use dormant_common::{DisableMode, FailurePolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::run::RunOptions;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub rally: RallyConfig,
    #[serde(default)]
    pub run: RunSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Rally WSAPI connection settings.
#[derive(Clone, Deserialize)]
pub struct RallyConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// API key, sent as ZSESSIONID. Takes precedence over username/password.
    #[serde(default)]
    pub api_key: Option<String>,
    /// WSAPI version segment (default: v2.0)
    #[serde(default = "default_version")]
    pub version: String,
    /// Users requested per query page (1..=2000)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Per-request timeout in seconds (default: 60)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_integration_name")]
    pub integration_name: String,
    #[serde(default = "default_integration_vendor")]
    pub integration_vendor: String,
    #[serde(default = "default_integration_version")]
    pub integration_version: String,
}

impl Default for RallyConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: None,
            password: None,
            api_key: None,
            version: default_version(),
            page_size: default_page_size(),
            timeout_secs: default_timeout(),
            integration_name: default_integration_name(),
            integration_vendor: default_integration_vendor(),
            integration_version: default_integration_version(),
        }
    }
}

// Secrets stay out of Debug output, which ends up in log files.
impl std::fmt::Debug for RallyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RallyConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("version", &self.version)
            .field("page_size", &self.page_size)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

/// Selection and execution settings.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RunSettings {
    /// Idle threshold in days
    #[serde(default)]
    pub days: Option<i64>,
    #[serde(default)]
    pub mode: DisableMode,
    /// Maximum number of accounts a run may touch
    #[serde(default)]
    pub failsafe_limit: Option<usize>,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Only ever set from the command line.
    #[serde(skip)]
    pub apply: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory the run log file is written to
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,
    /// Write a log file next to console output
    #[serde(default = "default_true")]
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: default_log_directory(),
            file: default_true(),
        }
    }
}

/// Values given on the command line, applied over every other source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOverrides {
    pub days: Option<i64>,
    pub mode: Option<DisableMode>,
    pub failsafe_limit: Option<usize>,
    pub continue_on_error: bool,
    pub apply: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error(
        "Missing Rally credentials: there is no password prompt, so set rally.api_key \
         (DORMANT__RALLY__API_KEY), or rally.username and rally.password \
         (DORMANT__RALLY__USERNAME, DORMANT__RALLY__PASSWORD)"
    )]
    MissingCredentials,
    #[error("Missing idle threshold: pass --days or set run.days")]
    MissingThreshold,
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// Default values
fn default_base_url() -> String {
    "https://rally1.rallydev.com".to_string()
}
fn default_version() -> String {
    "v2.0".to_string()
}
fn default_page_size() -> u32 {
    200
}
fn default_timeout() -> u64 {
    60
}
fn default_integration_name() -> String {
    "dormant".to_string()
}
fn default_integration_vendor() -> String {
    "Rally-Technical-Services".to_string()
}
fn default_integration_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_directory() -> PathBuf {
    PathBuf::from(".")
}
fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (DORMANT__SECTION__KEY format)
    /// 2. The file given with `--config`, else dormant.toml (if present)
    /// 3. Built-in defaults
    ///
    /// Command-line flags are layered on top with [`Config::apply_overrides`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("dormant").required(false),
        };

        let config = ConfigLoader::builder()
            .set_default("rally.base_url", default_base_url())?
            .set_default("rally.version", default_version())?
            .set_default("rally.page_size", default_page_size() as i64)?
            .set_default("logging.level", default_log_level())?
            .add_source(file)
            // Values stay strings; numeric fields convert on deserialize
            .add_source(Environment::with_prefix("DORMANT").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn apply_overrides(&mut self, overrides: RunOverrides) {
        if let Some(days) = overrides.days {
            self.run.days = Some(days);
        }
        if let Some(mode) = overrides.mode {
            self.run.mode = mode;
        }
        if let Some(limit) = overrides.failsafe_limit {
            self.run.failsafe_limit = Some(limit);
        }
        if overrides.continue_on_error {
            self.run.failure_policy = FailurePolicy::Continue;
        }
        self.run.apply = overrides.apply;
    }

    /// Check the settings the run cannot start without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let has_api_key = self.rally.api_key.as_deref().is_some_and(|k| !k.is_empty());
        let has_basic = self.rally.username.as_deref().is_some_and(|u| !u.is_empty())
            && self.rally.password.as_deref().is_some_and(|p| !p.is_empty());
        if !has_api_key && !has_basic {
            return Err(ConfigError::MissingCredentials);
        }

        if !(1..=2000).contains(&self.rally.page_size) {
            return Err(ConfigError::Invalid {
                field: "rally.page_size",
                reason: format!("{} is outside 1..=2000", self.rally.page_size),
            });
        }

        if self.rally.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "rally.timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }

        match self.run.days {
            None => Err(ConfigError::MissingThreshold),
            Some(days) if days < 0 => Err(ConfigError::Invalid {
                field: "run.days",
                reason: format!("{} is negative", days),
            }),
            Some(_) => Ok(()),
        }
    }

    /// Build the options for one run, processing as of `today`.
    pub fn run_options(&self, today: NaiveDate) -> Result<RunOptions, ConfigError> {
        self.validate()?;
        let threshold_days = self.run.days.ok_or(ConfigError::MissingThreshold)?;

        Ok(RunOptions {
            threshold_days,
            mode: self.run.mode,
            apply: self.run.apply,
            failsafe_limit: self.run.failsafe_limit,
            failure_policy: self.run.failure_policy,
            today,
        })
    }
}
