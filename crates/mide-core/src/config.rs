use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::step::{AttendeeType, Step};

const CONFIG_VERSION: u32 = 1;
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MideConfig {
    pub version: u32,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_session_file")]
    pub session_file: String,
    #[serde(default = "default_drafts_dir")]
    pub drafts_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            session_file: default_session_file(),
            drafts_dir: default_drafts_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub rules: Vec<ValidationRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ValidationRule {
    pub step: Step,
    #[serde(default)]
    pub attendee_type: Option<AttendeeType>,
    pub required: Vec<String>,
}

fn default_session_file() -> String {
    "session.json".to_string()
}

fn default_drafts_dir() -> String {
    "drafts".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl MideConfig {
    pub fn session_path(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.storage.session_file)
    }

    pub fn drafts_path(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.storage.drafts_dir)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not resolve home directory for config path")]
    HomeDirectoryUnavailable,
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {message}")]
    Validation { message: String },
}

pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(base_dirs
        .home_dir()
        .join(".config")
        .join("mide")
        .join("config.toml"))
}

pub fn load_config(path: &Path) -> Result<MideConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed: MideConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&parsed)?;
    Ok(parsed)
}

pub fn validate_config(config: &MideConfig) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(validation_error(format!("version must be {CONFIG_VERSION}")));
    }

    for (field, value) in [
        ("storage.session_file", &config.storage.session_file),
        ("storage.drafts_dir", &config.storage.drafts_dir),
    ] {
        if value.trim().is_empty() {
            return Err(validation_error(format!("{field} must be non-empty")));
        }
        if Path::new(value).is_absolute() {
            return Err(validation_error(format!(
                "{field} must be relative to the config directory"
            )));
        }
    }

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(validation_error(format!(
            "logging.level must be one of {}",
            LOG_LEVELS.join(", ")
        )));
    }

    for (index, rule) in config.validation.rules.iter().enumerate() {
        if rule.required.is_empty() {
            return Err(validation_error(format!(
                "validation.rules[{index}] must list at least one required field"
            )));
        }

        if rule.required.iter().any(|field| field.trim().is_empty()) {
            return Err(validation_error(format!(
                "validation.rules[{index}] required field names must be non-empty"
            )));
        }
    }

    Ok(())
}

fn validation_error(message: String) -> ConfigError {
    ConfigError::Validation { message }
}
