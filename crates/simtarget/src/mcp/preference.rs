use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const PREFERENCE_PATH_ENV: &str = "SIMTARGET_PREFERENCE_PATH";
const PREFERENCE_DIR: &str = ".simtarget";
const PREFERENCE_FILE: &str = "preference.json";

/// The single persisted "last selected device" pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    pub device_id: String,
    pub display_name: String,
    pub runtime_name: String,
    pub updated_at: DateTime<Utc>,
}

impl PreferenceRecord {
    pub fn new(device_id: String, display_name: String, runtime_name: String) -> Self {
        Self {
            device_id,
            display_name,
            runtime_name,
            updated_at: Utc::now(),
        }
    }
}

/// Whole-document JSON store for the preference record. Single writer,
/// single reader; concurrent writes race and the last one wins.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    /// Resolves the storage path from the environment override, falling back
    /// to `$HOME/.simtarget/preference.json`.
    pub fn new() -> Self {
        let path = std::env::var(PREFERENCE_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(PREFERENCE_DIR).join(PREFERENCE_FILE)
            });
        Self { path }
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Never fails: a missing or unparsable file is treated as empty.
    pub fn load(&self) -> Option<PreferenceRecord> {
        let data = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&data) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable preference file");
                None
            }
        }
    }

    /// Overwrites the whole document, creating parent directories as needed.
    pub fn save(&self, record: &PreferenceRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

impl Default for PreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}
