//! Settings management

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Engine settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub world: WorldSettings,
    pub runtime: RuntimeSettings,
    pub log: LogSettings,
}

/// Which entity wins when several share a name.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameLookupOrder {
    #[default]
    FirstCreated,
    LastCreated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub name_lookup: NameLookupOrder,
    pub gravity: [f32; 3],
    pub default_collider_radius: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            name_lookup: NameLookupOrder::FirstCreated,
            gravity: [0.0, -9.81, 0.0],
            default_collider_radius: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub tick_rate_hz: u32,
    /// Frames to run before exiting. Zero runs until stopped.
    pub max_frames: u64,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            tick_rate_hz: tether_core::time::DEFAULT_TICK_RATE_HZ,
            max_frames: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`Settings::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "world": { "name_lookup": "last_created" } }"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.world.name_lookup, NameLookupOrder::LastCreated);
        assert_eq!(settings.world.gravity, [0.0, -9.81, 0.0]);
        assert_eq!(settings.runtime.tick_rate_hz, 60);
        assert_eq!(settings.log.filter, "info");
    }

    #[test]
    fn test_missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_or_default(dir.path().join("none.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_missing_file_is_error_for_load() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Settings::load(dir.path().join("none.json")),
            Err(SettingsError::Io { .. })
        ));
    }

    #[test]
    fn test_bad_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ world: ").unwrap();
        assert!(matches!(
            Settings::load_or_default(&path),
            Err(SettingsError::Parse { .. })
        ));
    }
}
