//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Session defaults (duration, goal)
//! - Pacing knobs (time menu, tick rate, review blocks)
//! - Inactivity nudges
//! - Assistant model and credential source
//! - Summary endpoint
//!
//! Configuration is stored at `~/.config/studypace/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;

/// Defaults offered on the setup screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_minutes")]
    pub default_minutes: u64,
    #[serde(default)]
    pub default_goal: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Seconds offered when choosing a slide's time.
    #[serde(default = "default_time_menu")]
    pub time_menu_secs: Vec<u64>,
    /// How often the front end drives `tick()`.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Advances between review blocks.
    #[serde(default = "default_review_every")]
    pub review_every: u32,
    #[serde(default = "default_review_block_secs")]
    pub review_block_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoredomConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_boredom_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key. The key itself is never
    /// written to the config file.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_assistant_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_summary_endpoint")]
    pub endpoint: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studypace/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub boredom: BoredomConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
}

// Default functions
fn default_minutes() -> u64 {
    60
}
fn default_time_menu() -> Vec<u64> {
    vec![15, 30, 45, 60, 90, 120]
}
fn default_tick_ms() -> u64 {
    250
}
fn default_review_every() -> u32 {
    5
}
fn default_review_block_secs() -> u64 {
    300
}
fn default_true() -> bool {
    true
}
fn default_boredom_timeout() -> u64 {
    45
}
fn default_poll_secs() -> u64 {
    5
}
fn default_model() -> String {
    "gemini-1.5-flash".into()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_assistant_base_url() -> String {
    "https://generativelanguage.googleapis.com/".into()
}
fn default_summary_endpoint() -> String {
    "http://localhost:3000/api/sessions".into()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_minutes(),
            default_goal: String::new(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            time_menu_secs: default_time_menu(),
            tick_ms: default_tick_ms(),
            review_every: default_review_every(),
            review_block_secs: default_review_block_secs(),
        }
    }
}

impl Default for BoredomConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: default_boredom_timeout(),
            poll_secs: default_poll_secs(),
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            base_url: default_assistant_base_url(),
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_summary_endpoint(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        if key.is_empty() {
            return Err(unknown());
        }

        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    let n = value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                    serde_json::Value::Number(n.into())
                }
                serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                serde_json::Value::Object(_) => return Err(unknown()),
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Location of the config file in the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Parse a config file at an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. Does not persist; call [`Config::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// existing field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = %e, "using default configuration");
                Self::default()
            }
        }
    }
}
