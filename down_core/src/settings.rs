//! # Factory Settings
//!
//! Persists the factory name and location between sessions, keyed by an
//! organization/application pair under the platform config directory
//! (`<config_dir>/DownAllocation/FactoryInfo.json`). A missing file loads as
//! empty defaults; the first run of a front end prompts for the values.
//!
//! ## Example
//!
//! ```rust,no_run
//! use down_core::settings::{FactoryInfo, SettingsStore};
//!
//! let store = SettingsStore::open_default()?;
//! let mut info = store.load()?;
//! if !info.is_configured() {
//!     info.name = "EVERWARM GARMENTS".to_string();
//!     info.location = "Hanoi".to_string();
//!     store.save(&info)?;
//! }
//! # Ok::<(), down_core::errors::AllocError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{AllocError, AllocResult};
use crate::file_io::write_atomic;

/// Organization segment of the settings path
pub const ORGANIZATION: &str = "DownAllocation";

/// Application segment of the settings path
pub const APPLICATION: &str = "FactoryInfo";

/// Factory identity printed on every form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactoryInfo {
    /// Factory name (form title line)
    #[serde(default)]
    pub name: String,

    /// Factory location (city or address)
    #[serde(default)]
    pub location: String,
}

impl FactoryInfo {
    /// True once a factory name has been entered.
    pub fn is_configured(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Handle to the settings file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Open the store at the platform default location.
    ///
    /// # Errors
    ///
    /// `FileError` when the platform exposes no config directory.
    pub fn open_default() -> AllocResult<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            AllocError::file_error(
                "locate config directory",
                ORGANIZATION,
                "No platform config directory available",
            )
        })?;
        Ok(SettingsStore::at_path(
            config_dir
                .join(ORGANIZATION)
                .join(format!("{}.json", APPLICATION)),
        ))
    }

    /// Open the store at an explicit path (tests, portable installs).
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        SettingsStore { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored factory info; a missing file yields the default.
    pub fn load(&self) -> AllocResult<FactoryInfo> {
        if !self.path.exists() {
            log::debug!("No settings file at {}, using defaults", self.path.display());
            return Ok(FactoryInfo::default());
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            AllocError::file_error("read settings", self.path.display().to_string(), e.to_string())
        })?;

        serde_json::from_str(&contents).map_err(|e| AllocError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", self.path.display(), e),
        })
    }

    /// Save the factory info, creating parent directories as needed.
    pub fn save(&self, info: &FactoryInfo) -> AllocResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AllocError::file_error(
                    "create settings directory",
                    parent.display().to_string(),
                    e.to_string(),
                )
            })?;
        }

        let json = serde_json::to_string_pretty(info).map_err(|e| {
            AllocError::SerializationError {
                reason: e.to_string(),
            }
        })?;

        write_atomic(&self.path, &json)?;
        log::info!("Saved factory settings to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, SettingsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at_path(dir.path().join(ORGANIZATION).join("FactoryInfo.json"));
        (dir, store)
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let (_dir, store) = temp_store();
        let info = store.load().unwrap();
        assert_eq!(info, FactoryInfo::default());
        assert!(!info.is_configured());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (_dir, store) = temp_store();

        let info = FactoryInfo {
            name: "EVERWARM GARMENTS".to_string(),
            location: "Hanoi".to_string(),
        };
        store.save(&info).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, info);
        assert!(loaded.is_configured());
    }

    #[test]
    fn test_save_overwrites_previous_values() {
        let (_dir, store) = temp_store();

        store
            .save(&FactoryInfo {
                name: "OLD NAME".to_string(),
                location: String::new(),
            })
            .unwrap();
        store
            .save(&FactoryInfo {
                name: "NEW NAME".to_string(),
                location: "Dhaka".to_string(),
            })
            .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.name, "NEW NAME");
        assert_eq!(loaded.location, "Dhaka");
    }

    #[test]
    fn test_partial_file_fills_missing_fields() {
        let (_dir, store) = temp_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), r#"{ "name": "SOLO" }"#).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.name, "SOLO");
        assert_eq!(loaded.location, "");
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let (_dir, store) = temp_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "not json").unwrap();

        let err = store.load().unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
