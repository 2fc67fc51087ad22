// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI configuration management.
//!
//! Configuration lives in `drift/config.toml` under the platform config
//! directory (overridable with `--config`). A missing file is not an
//! error; every setting has a default. The tuning sections map straight
//! onto drift-core's [`Config`]:
//!
//! ```toml
//! url = "wss://sync.example.com/ws"
//!
//! [retry]
//! max_retries = 5
//!
//! [breaker]
//! failure_threshold = 3
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use drift_core::Config;

use crate::error::{Error, Result};

const CONFIG_DIR_NAME: &str = "drift";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "drift.db";

fn default_url() -> String {
    "ws://127.0.0.1:9090".to_string()
}

/// Top-level CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    /// WebSocket URL of the sync server.
    #[serde(default = "default_url")]
    pub url: String,
    /// Directory for the local database. Defaults to the platform data
    /// directory.
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
    /// Sync layer tuning, flattened so `[retry]`, `[breaker]` and
    /// friends are top-level TOML sections.
    #[serde(flatten)]
    pub sync: Config,
}

impl Default for FileConfig {
    fn default() -> Self {
        FileConfig {
            url: default_url(),
            state_dir: None,
            sync: Config::default(),
        }
    }
}

impl FileConfig {
    /// Loads configuration from the given path, or from the default
    /// location when `path` is `None`. A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path(),
        };

        if !path.exists() {
            return Ok(FileConfig::default());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: FileConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("failed to parse config: {e}")))
    }

    /// The directory holding the local database, created if needed.
    pub fn state_dir(&self) -> Result<PathBuf> {
        let dir = match &self.state_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(CONFIG_DIR_NAME),
        };
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Path of the local database file.
    pub fn db_path(&self) -> Result<PathBuf> {
        Ok(self.state_dir()?.join(DB_FILE_NAME))
    }
}

/// Default config file location under the platform config directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
