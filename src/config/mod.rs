use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) const MIN_SUGGESTIONS: usize = 5;
pub(crate) const MAX_SUGGESTIONS: usize = 20;

#[derive(Error, Debug)]
pub(crate) enum ConfigError {
    #[error("unable to access {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("unable to encode config: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("unknown config key '{0}'")]
    UnknownKey(String),

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue { key: String, value: String, reason: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) database_path: PathBuf,
    pub(crate) backup_path: PathBuf,
    pub(crate) auto_backup: bool,
    pub(crate) backup_interval_days: u32,
    pub(crate) suggestions_enabled: bool,
    pub(crate) max_suggestions: usize,
    pub(crate) currency_symbol: String,

    #[serde(skip)]
    file_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Config {
            database_path: data_dir.join("financial_data.json"),
            backup_path: data_dir.join("backups"),
            auto_backup: true,
            backup_interval_days: 7,
            suggestions_enabled: true,
            max_suggestions: 10,
            currency_symbol: "R$".to_string(),
            file_path: None,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("fintrack")
}

pub(crate) fn default_config_path() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("fintrack").join("config.toml")
}

impl Config {
    /// Load config from a TOML file. Missing file or missing keys fall back to defaults.
    /// Relative paths inside the file are resolved against the file's directory.
    pub(crate) fn load_from_file(file_path: &Path) -> Result<Config, ConfigError> {
        let mut config = if file_path.is_file() {
            let content = fs::read_to_string(file_path)
                .map_err(|source| ConfigError::Io { path: file_path.to_path_buf(), source })?;
            toml::from_str::<Config>(&content)
                .map_err(|source| ConfigError::Parse { path: file_path.to_path_buf(), source })?
        } else {
            info!("Config file {} not found, using defaults", file_path.display());
            Config::default()
        };

        if let Some(base) = file_path.parent() {
            config.database_path = resolve(base, &config.database_path);
            config.backup_path = resolve(base, &config.backup_path);
        }
        config.max_suggestions = config.max_suggestions.clamp(MIN_SUGGESTIONS, MAX_SUGGESTIONS);
        config.file_path = Some(file_path.to_path_buf());

        Ok(config)
    }

    /// Create the data and backup directories if they don't exist yet
    pub(crate) fn ensure_directories(&self) -> Result<(), ConfigError> {
        let database_dir = self.database_path.parent().filter(|p| !p.as_os_str().is_empty());
        for dir in database_dir.into_iter().chain(std::iter::once(self.backup_path.as_path())) {
            if !dir.exists() {
                info!("Creating directory {}", dir.display());
                fs::create_dir_all(dir).map_err(|source| ConfigError::Io { path: dir.to_path_buf(), source })?;
            }
        }
        Ok(())
    }

    pub(crate) fn save(&self) -> Result<(), ConfigError> {
        let Some(file_path) = &self.file_path else {
            return Ok(());
        };

        let encoded = toml::to_string_pretty(self)?;
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io { path: parent.to_path_buf(), source })?;
        }
        fs::write(file_path, encoded).map_err(|source| ConfigError::Io { path: file_path.clone(), source })
    }

    /// Update a single key from its string form. Nothing is written until [`Config::save`].
    pub(crate) fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        match key.to_ascii_lowercase().as_str() {
            "database_path" => self.database_path = self.resolve_path(value),
            "backup_path" => self.backup_path = self.resolve_path(value),
            "auto_backup" => self.auto_backup = parse_bool(value).ok_or_else(|| invalid("expected true or false"))?,
            "backup_interval_days" => {
                let days = value.parse::<u32>().map_err(|_| invalid("expected a number of days"))?;
                if days == 0 {
                    return Err(invalid("must be at least 1"));
                }
                self.backup_interval_days = days;
            }
            "suggestions_enabled" => self.suggestions_enabled = parse_bool(value).ok_or_else(|| invalid("expected true or false"))?,
            "max_suggestions" => {
                let max = value.parse::<usize>().map_err(|_| invalid("expected a number"))?;
                self.max_suggestions = max.clamp(MIN_SUGGESTIONS, MAX_SUGGESTIONS);
            }
            "currency_symbol" => self.currency_symbol = value.to_string(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }

        info!("Config {key} set to {value}");
        Ok(())
    }

    /// Relative paths are taken from the config file's directory
    fn resolve_path(&self, value: &str) -> PathBuf {
        match self.file_path.as_deref().and_then(Path::parent) {
            Some(base) => resolve(base, Path::new(value)),
            None => PathBuf::from(value),
        }
    }

    pub(crate) fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Key/value pairs for display
    pub(crate) fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("database_path", self.database_path.display().to_string()),
            ("backup_path", self.backup_path.display().to_string()),
            ("auto_backup", self.auto_backup.to_string()),
            ("backup_interval_days", self.backup_interval_days.to_string()),
            ("suggestions_enabled", self.suggestions_enabled.to_string()),
            ("max_suggestions", self.max_suggestions.to_string()),
            ("currency_symbol", self.currency_symbol.clone()),
        ]
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
