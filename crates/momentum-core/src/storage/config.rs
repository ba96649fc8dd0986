//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Focus timer and idle fallback lengths
//! - Conflict search bounds and session length
//! - Default ON/OFF windows
//!
//! Configuration is stored at `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::calendar::OnOffWindows;
use crate::error::ConfigError;
use crate::scheduler::{ResolverConfig, DEFAULT_MAX_STEPS, DEFAULT_SESSION_HOURS};
use crate::session::SessionConfig;

/// Focus session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,
    #[serde(default = "default_idle_fallback_minutes")]
    pub idle_fallback_minutes: u32,
}

/// Reschedule and conflict search configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    #[serde(default = "default_max_conflict_steps")]
    pub max_conflict_steps: u32,
    #[serde(default = "default_session_hours")]
    pub session_hours: u32,
}

/// Default ON/OFF windows as `HH:MM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnOffConfig {
    #[serde(default = "default_on_start")]
    pub on_start: String,
    #[serde(default = "default_on_end")]
    pub on_end: String,
    #[serde(default = "default_off_start")]
    pub off_start: String,
    #[serde(default = "default_off_end")]
    pub off_end: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub on_off: OnOffConfig,
}

// Default functions
fn default_focus_minutes() -> u32 {
    25
}
fn default_idle_fallback_minutes() -> u32 {
    5
}
fn default_max_conflict_steps() -> u32 {
    DEFAULT_MAX_STEPS
}
fn default_session_hours() -> u32 {
    DEFAULT_SESSION_HOURS as u32
}
fn default_on_start() -> String {
    "12:00".into()
}
fn default_on_end() -> String {
    "13:00".into()
}
fn default_off_start() -> String {
    "16:30".into()
}
fn default_off_end() -> String {
    "18:00".into()
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            focus_minutes: default_focus_minutes(),
            idle_fallback_minutes: default_idle_fallback_minutes(),
        }
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            max_conflict_steps: default_max_conflict_steps(),
            session_hours: default_session_hours(),
        }
    }
}

impl Default for OnOffConfig {
    fn default() -> Self {
        Self {
            on_start: default_on_start(),
            on_end: default_on_end(),
            off_start: default_off_start(),
            off_end: default_off_end(),
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
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => value
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|e| invalid(e.to_string()))?,
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
                serde_json::Value::Object(_) => return Err(unknown()),
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// `<data dir>/config.toml`
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed or fails
    /// validation, or if the default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
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
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key, in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value has the wrong type,
    /// or the resulting config is invalid. `self` is unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// All leaf keys with their values, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Ok(serde_json::Value::Object(sections)) = serde_json::to_value(self) {
            for (section, fields) in sections {
                if let serde_json::Value::Object(fields) = fields {
                    for (name, value) in fields {
                        let value = match value {
                            serde_json::Value::String(s) => s,
                            other => other.to_string(),
                        };
                        out.push((format!("{section}.{name}"), value));
                    }
                }
            }
        }
        out
    }

    /// Check ranges and `HH:MM` windows.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.focus_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "session.focus_minutes".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.scheduling.session_hours == 0 || self.scheduling.session_hours > 24 {
            return Err(ConfigError::InvalidValue {
                key: "scheduling.session_hours".into(),
                message: "must be within 1..=24".into(),
            });
        }
        let windows = self.on_off_windows()?;
        for (name, (start, end)) in [("on_off.on", windows.on), ("on_off.off", windows.off)] {
            if start >= end {
                return Err(ConfigError::InvalidValue {
                    key: name.into(),
                    message: "window must end after it starts".into(),
                });
            }
        }
        Ok(())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            focus_minutes: self.session.focus_minutes,
            idle_fallback_minutes: self.session.idle_fallback_minutes,
        }
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            session: chrono::Duration::hours(self.scheduling.session_hours as i64),
            max_steps: self.scheduling.max_conflict_steps,
        }
    }

    pub fn on_off_windows(&self) -> Result<OnOffWindows, ConfigError> {
        OnOffWindows::parse(
            &self.on_off.on_start,
            &self.on_off.on_end,
            &self.on_off.off_start,
            &self.on_off.off_end,
        )
        .map_err(|e| ConfigError::InvalidValue {
            key: "on_off".into(),
            message: e.to_string(),
        })
    }
}
