//! Configuration handling for the maungdb CLI
//!
//! Settings come from `maungdb.toml` in the working directory (optional),
//! then environment variables, then command-line flags.
//!
//! ## Environment Variables
//!
//! - `MAUNGDB_DATA_DIR` - Root directory holding `db_<name>/` folders
//! - `MAUNGDB_DATABASE` - Database selected at startup
//! - `MAUNGDB_USER` - Session user name
//! - `MAUNGDB_ROLE` - Session role
//!
//! These can be set in a `.env` file next to the config file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::DbResult;

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "maungdb.toml";

/// Environment variable names
pub const ENV_DATA_DIR: &str = "MAUNGDB_DATA_DIR";
pub const ENV_DATABASE: &str = "MAUNGDB_DATABASE";
pub const ENV_USER: &str = "MAUNGDB_USER";
pub const ENV_ROLE: &str = "MAUNGDB_ROLE";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root data directory
    pub data_dir: PathBuf,
    /// Database selected at startup
    pub database: String,
    /// Session user name
    pub username: String,
    /// Session role
    pub role: String,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("maung_data"),
            database: "default".to_string(),
            username: "maung".to_string(),
            role: maungql_core::SUPER_ROLE.to_string(),
            log_filter: "maungdb=info,maungql_core=info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a directory
    ///
    /// Loads any `.env` file in the directory first. A missing config file
    /// is not an error; defaults apply.
    pub fn load(dir: &Path) -> DbResult<Self> {
        let env_path = dir.join(".env");
        if env_path.exists() {
            let _ = dotenvy::from_path(&env_path);
        }

        let mut config = Self::from_file(&dir.join(CONFIG_FILE_NAME))?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Read a config file, or defaults if it does not exist
    pub fn from_file(path: &Path) -> DbResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply overrides from a variable lookup; empty values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(data_dir) = get(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(data_dir);
        }
        if let Some(database) = get(ENV_DATABASE) {
            self.database = database;
        }
        if let Some(user) = get(ENV_USER) {
            self.username = user;
        }
        if let Some(role) = get(ENV_ROLE) {
            self.role = role;
        }
    }

    /// Save configuration to a directory
    pub fn save(&self, dir: &Path) -> anyhow::Result<()> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.data_dir, PathBuf::from("maung_data"));
        assert_eq!(config.role, "supermaung");
        assert_eq!(config.database, "default");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str("database = \"kantor\"").unwrap();
        assert_eq!(config.database, "kantor");
        assert_eq!(config.username, "maung");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_DATA_DIR, "/tmp/maung"),
            (ENV_ROLE, "user"),
            (ENV_USER, ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/maung"));
        assert_eq!(config.role, "user");
        // Empty values do not override
        assert_eq!(config.username, "maung");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir = \"maung_data\""));
        assert!(toml_str.contains("role = \"supermaung\""));
    }
}
