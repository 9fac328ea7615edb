//! TOML-based application configuration.
//!
//! Stores tunables for:
//! - the countdown duration bounds
//! - reminder fire-early offset, snooze delay and snooze ceiling
//! - session duration bounds, reminder window and dismissal ceiling
//! - the text-generation model
//!
//! Configuration is stored at `~/.config/academic-muse/config.toml`.
//! Secrets never live here; the endpoint URL and key come from the environment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Countdown configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_focus_minutes")]
    pub default_minutes: u32,
    #[serde(default = "default_focus_minutes")]
    pub min_minutes: u32,
    #[serde(default = "default_max_minutes")]
    pub max_minutes: u32,
}

/// Daily reminder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Seconds before the configured time at which the reminder fires.
    #[serde(default = "default_fire_early_secs")]
    pub fire_early_secs: u64,
    #[serde(default = "default_snooze_delay_secs")]
    pub snooze_delay_secs: u64,
    #[serde(default = "default_max_snooze")]
    pub max_snooze: u8,
}

/// Same-day session scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_min_session")]
    pub min_session_minutes: i64,
    #[serde(default = "default_max_minutes_i64")]
    pub max_session_minutes: i64,
    /// Width of the pre-session reminder window, and of the grace period
    /// after start before an unacknowledged session is skipped.
    #[serde(default = "default_window_minutes")]
    pub reminder_window_minutes: i64,
    #[serde(default = "default_max_dismissals")]
    pub max_dismissals: u32,
    #[serde(default = "default_sweep_secs")]
    pub sweep_interval_secs: u64,
}

/// Text-generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_model")]
    pub model: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/academic-muse/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

fn default_focus_minutes() -> u32 {
    25
}
fn default_max_minutes() -> u32 {
    120
}
fn default_fire_early_secs() -> u64 {
    10
}
fn default_snooze_delay_secs() -> u64 {
    60
}
fn default_max_snooze() -> u8 {
    3
}
fn default_min_session() -> i64 {
    30
}
fn default_max_minutes_i64() -> i64 {
    120
}
fn default_window_minutes() -> i64 {
    5
}
fn default_max_dismissals() -> u32 {
    10
}
fn default_sweep_secs() -> u64 {
    60
}
fn default_model() -> String {
    "llama3-8b-8192".into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_focus_minutes(),
            min_minutes: default_focus_minutes(),
            max_minutes: default_max_minutes(),
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            fire_early_secs: default_fire_early_secs(),
            snooze_delay_secs: default_snooze_delay_secs(),
            max_snooze: default_max_snooze(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_session_minutes: default_min_session(),
            max_session_minutes: default_max_minutes_i64(),
            reminder_window_minutes: default_window_minutes(),
            max_dismissals: default_max_dismissals(),
            sweep_interval_secs: default_sweep_secs(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
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

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as integer")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(unknown());
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or create the default file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
