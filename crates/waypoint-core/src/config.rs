//! Settings file loading.
//!
//! Settings live in a single JSON file. Without an explicit path the file is
//! looked up at `$XDG_CONFIG_HOME/waypoint/settings.json`; a missing file
//! yields the defaults. Every key is optional:
//!
//! ```json
//! {
//!   "executor": { "auto_rollback": false, "step_delay": 250 },
//!   "tools": { "result_budget": 8000, "blocked_paths": ["secrets/"] }
//! }
//! ```
//!
//! Durations are written as whole milliseconds; `null` disables an optional
//! timeout or delay.

use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, WaypointError},
    executor::ExecutorConfig,
    tools::ToolEngineConfig,
};

const APP_PREFIX: &str = "waypoint";
const SETTINGS_FILE: &str = "settings.json";

/// Settings for both engines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub executor: ExecutorConfig,
    pub tools: ToolEngineConfig,
}

impl Settings {
    /// Loads settings from `path`, or from the XDG config location when
    /// `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file cannot be read, or if
    /// the file that was found is not valid settings JSON.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::find_default() {
                Some(path) => Self::from_file(&path),
                None => {
                    debug!("No settings file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Reads and parses one settings file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| WaypointError::FileSystem {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&raw)?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Sets both engines' workspace root.
    pub fn with_workspace_root(mut self, root: impl Into<String>) -> Self {
        let root = root.into();
        self.executor.workspace_root = root.clone();
        self.tools.workspace_root = root;
        self
    }

    /// Path where a settings file would be picked up, creating the parent
    /// directory if needed.
    pub fn default_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix(APP_PREFIX)
            .place_config_file(SETTINGS_FILE)
            .map_err(|e| WaypointError::XdgDirectory(e.to_string()))
    }

    fn find_default() -> Option<PathBuf> {
        xdg::BaseDirectories::with_prefix(APP_PREFIX).find_config_file(SETTINGS_FILE)
    }
}

/// Serde helpers for a `Duration` stored as whole milliseconds.
pub(crate) mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Serde helpers for an `Option<Duration>` stored as milliseconds or null.
pub(crate) mod optional_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|ms| ms.map(Duration::from_millis))
    }
}
