//! Configuration management for medlist.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::DEFAULT_SLOT;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "medlist";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "medlist.db";

/// Default editor PIN.
const DEFAULT_PIN: &str = "1234";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `MEDLIST_`)
/// 2. TOML config file at `~/.config/medlist/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Editor mode configuration.
    pub editor: EditorConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/medlist/medlist.db`
    pub database_path: Option<PathBuf>,
    /// Name of the slot holding user-added doctors.
    pub slot: String,
}

/// Editor mode configuration.
///
/// The PIN is stored and compared in plain text. It keeps casual users out
/// of the edit commands and nothing more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// PIN that unlocks editor mode.
    pub pin: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            slot: DEFAULT_SLOT.to_string(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            pin: DEFAULT_PIN.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `MEDLIST_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("MEDLIST_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.slot.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "storage.slot must not be empty".to_string(),
            });
        }

        if self.editor.pin.is_empty() {
            return Err(Error::ConfigValidation {
                message: "editor.pin must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert_eq!(config.storage.slot, "doctors");
        assert_eq!(config.editor.pin, "1234");
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_slot() {
        let mut config = Config::default();
        config.storage.slot = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("storage.slot"));
    }

    #[test]
    fn test_validate_empty_pin() {
        let mut config = Config::default();
        config.editor.pin = String::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("editor.pin"));
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("medlist.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("medlist"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[storage]\ndatabase_path = \"/tmp/dir.db\"\nslot = \"medicos\"\n\n[editor]\npin = \"9876\""
        )
        .unwrap();

        let config = Config::load_from(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/dir.db"));
        assert_eq!(config.storage.slot, "medicos");
        assert_eq!(config.editor.pin, "9876");
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[editor]\npin = \"\"").unwrap();

        let err = Config::load_from(Some(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("slot"));
        assert!(json.contains("pin"));
    }

    #[test]
    fn test_storage_config_deserialize_partial() {
        let storage: StorageConfig = serde_json::from_str(r#"{"slot": "x"}"#).unwrap();
        assert_eq!(storage.slot, "x");
        assert!(storage.database_path.is_none());
    }
}
