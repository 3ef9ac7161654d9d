//! Shell configuration loaded from `nodeq.json`.
//!
//! Every field is optional. Lookup order:
//!
//! 1. the path passed with `--config` (must exist)
//! 2. `./nodeq.json`
//! 3. `<config dir>/nodeq/nodeq.json` (e.g. `~/.config/nodeq/nodeq.json`)
//!
//! ```json
//! {
//!   "prompt": "nodeq> ",
//!   "color": true,
//!   "confirm_overwrite": true,
//!   "confirm_discard": true
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// File name looked up in the working directory and the config directory.
pub const CONFIG_FILE: &str = "nodeq.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Printed before each command in interactive mode.
    pub prompt: String,

    /// Colored terminal output.
    pub color: bool,

    /// Ask before `save` replaces an existing file.
    pub confirm_overwrite: bool,

    /// Ask before `exit`, `load` or `create` drop unsaved changes.
    pub confirm_discard: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: "nodeq> ".to_string(),
            color: true,
            confirm_overwrite: true,
            confirm_discard: true,
        }
    }
}

impl Config {
    /// Resolves the configuration, falling back to defaults when no file exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for candidate in Self::candidates() {
            if candidate.is_file() {
                return Self::from_file(&candidate);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("nodeq").join(CONFIG_FILE));
        }
        paths
    }
}
