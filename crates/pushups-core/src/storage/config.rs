//! TOML-based application configuration.
//!
//! Holds the daily goal, reminder schedule, history window, Telegram API
//! settings and an optional database location. Stored at
//! `~/.config/pushups/config.toml`. The bot token is deliberately not part
//! of the file; see [`crate::integrations::telegram::resolve_token`].

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::record::DEFAULT_DAILY_GOAL;

const REMINDER_TIME_FORMAT: &str = "%H:%M";

/// Daily target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalConfig {
    #[serde(default = "default_goal")]
    pub daily: u32,
}

/// End-of-day reminder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Local time of day, `HH:MM`.
    #[serde(default = "default_reminder_time")]
    pub time: String,
}

/// `calendar` command settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_days")]
    pub days: u32,
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Long-poll timeout passed to `getUpdates`.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overrides the default `<data dir>/pushups.db`.
    #[serde(default)]
    pub database_path: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub goal: GoalConfig,
    #[serde(default)]
    pub reminder: ReminderConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_goal() -> u32 {
    DEFAULT_DAILY_GOAL
}
fn default_true() -> bool {
    true
}
fn default_reminder_time() -> String {
    "20:00".into()
}
fn default_history_days() -> u32 {
    7
}
fn default_api_base() -> String {
    "https://api.telegram.org".into()
}
fn default_poll_timeout() -> u64 {
    30
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            daily: default_goal(),
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            time: default_reminder_time(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            days: default_history_days(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            poll_timeout_secs: default_poll_timeout(),
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
        let unknown = || ConfigError::InvalidValue {
            key: key.to_string(),
            message: "unknown config key".into(),
        };
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(ConfigError::MissingKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
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
                    // Optional fields serialize as null; "none" clears them.
                    serde_json::Value::Null if value.eq_ignore_ascii_case("none") => {
                        serde_json::Value::Null
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
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

    /// Default config file location.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults there if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation, or if the default config cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
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

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
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

    /// Update a value in memory by dot-separated key.
    ///
    /// The change is rejected, leaving `self` untouched, if the key is
    /// unknown or the result does not validate.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// [`apply`](Self::apply) then save to the default location.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Check cross-field constraints the types cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.goal.daily == 0 {
            return Err(ConfigError::InvalidValue {
                key: "goal.daily".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.history.days == 0 {
            return Err(ConfigError::InvalidValue {
                key: "history.days".into(),
                message: "must be greater than 0".into(),
            });
        }
        self.reminder_time()?;
        url::Url::parse(&self.telegram.api_base).map_err(|e| ConfigError::InvalidValue {
            key: "telegram.api_base".into(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// The parsed reminder trigger time.
    pub fn reminder_time(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(&self.reminder.time, REMINDER_TIME_FORMAT).map_err(|e| {
            ConfigError::InvalidValue {
                key: "reminder.time".into(),
                message: format!("expected HH:MM, got '{}': {e}", self.reminder.time),
            }
        })
    }

    /// Database file to open, `None` for the default location.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.storage.database_path.as_ref().map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.goal.daily, 100);
        assert_eq!(parsed.reminder.time, "20:00");
        assert_eq!(parsed.history.days, 7);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[goal]\ndaily = 50\n").unwrap();
        assert_eq!(parsed.goal.daily, 50);
        assert!(parsed.reminder.enabled);
        assert_eq!(parsed.telegram.poll_timeout_secs, 30);
        assert!(parsed.storage.database_path.is_none());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("goal.daily").as_deref(), Some("100"));
        assert_eq!(cfg.get("reminder.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("reminder.time").as_deref(), Some("20:00"));
        assert!(cfg.get("goal.missing_key").is_none());
    }

    #[test]
    fn apply_updates_number_bool_and_string() {
        let mut cfg = Config::default();
        cfg.apply("goal.daily", "150").unwrap();
        cfg.apply("reminder.enabled", "false").unwrap();
        cfg.apply("reminder.time", "21:30").unwrap();
        assert_eq!(cfg.goal.daily, 150);
        assert!(!cfg.reminder.enabled);
        assert_eq!(
            cfg.reminder_time().unwrap(),
            NaiveTime::from_hms_opt(21, 30, 0).unwrap()
        );
    }

    #[test]
    fn apply_sets_and_clears_optional_path() {
        let mut cfg = Config::default();
        cfg.apply("storage.database_path", "/tmp/p.db").unwrap();
        assert_eq!(cfg.database_path(), Some(PathBuf::from("/tmp/p.db")));
        cfg.apply("storage.database_path", "none").unwrap();
        assert!(cfg.database_path().is_none());
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(cfg.apply("goal.weekly", "1").is_err());
        assert!(cfg.apply("", "1").is_err());
    }

    #[test]
    fn apply_rejects_invalid_values_without_mutating() {
        let mut cfg = Config::default();
        assert!(cfg.apply("goal.daily", "0").is_err());
        assert!(cfg.apply("goal.daily", "lots").is_err());
        assert!(cfg.apply("reminder.enabled", "maybe").is_err());
        assert!(cfg.apply("reminder.time", "25:00").is_err());
        assert!(cfg.apply("telegram.api_base", "not a url").is_err());
        assert_eq!(cfg.goal.daily, 100);
        assert_eq!(cfg.reminder.time, "20:00");
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.goal.daily, 100);
        assert!(path.exists());
    }

    #[test]
    fn load_from_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[goal]\ndaily = 0\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));

        std::fs::write(&path, "goal = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseFailed(_))
        ));
    }

    #[test]
    fn save_then_load_preserves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.apply("history.days", "14").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.history.days, 14);
    }
}
