//! Store configuration.
//!
//! Supports TOML config files, environment variable overrides, and defaults.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Initial row capacity reserved for each new table
    pub initial_table_capacity: usize,
    /// Directory holding `<table>.json` seed files
    pub seed_dir: PathBuf,
    /// Tables to seed, in load order
    pub seed_tables: Vec<String>,
    /// Log filter directive passed to the subscriber (e.g. "info,relstore_core=debug")
    pub log_filter: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_table_capacity: 64,
            seed_dir: PathBuf::from("./data/seed"),
            seed_tables: Vec::new(),
            log_filter: "info".to_string(),
        }
    }
}

impl StoreConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| DbError::ConfigError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| DbError::ConfigError(format!("Invalid TOML: {}", e)))
    }

    /// Applies environment variable overrides.
    ///
    /// Variables are prefixed with `RELSTORE_`, e.g. `RELSTORE_SEED_DIR=/path`
    /// overrides `seed_dir`. `RELSTORE_SEED_TABLES` is a comma separated list.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = env::var("RELSTORE_INITIAL_TABLE_CAPACITY") {
            self.initial_table_capacity = val.parse().map_err(|_| {
                DbError::ConfigError(format!("Invalid initial_table_capacity: {}", val))
            })?;
        }
        if let Ok(val) = env::var("RELSTORE_SEED_DIR") {
            self.seed_dir = PathBuf::from(val);
        }
        if let Ok(val) = env::var("RELSTORE_SEED_TABLES") {
            self.seed_tables = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(val) = env::var("RELSTORE_LOG") {
            self.log_filter = val;
        }
        Ok(())
    }
}
