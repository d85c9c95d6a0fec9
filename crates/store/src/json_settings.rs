//! JSON-file settings backend for native builds.
//!
//! Settings live in one small pretty-printed JSON object keyed by the
//! schema constants in [`crate::settings`]. Every set rewrites the whole
//! file through [`atomic_write`], so the file on disk always matches the
//! last successful write.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bevy::log::warn;

use crate::atomic_write::atomic_write;
use crate::error::SettingsError;
use crate::settings::SettingsStore;

pub struct JsonFileSettings {
    path: PathBuf,
    values: BTreeMap<String, serde_json::Value>,
}

impl JsonFileSettings {
    /// Opens the settings file. A missing file starts empty; an unreadable
    /// or unparseable one is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let values = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| SettingsError::Corrupt(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    /// Like [`open`](Self::open), but recovers from a bad file instead of
    /// failing. A file that does not parse is moved aside to `{path}.corrupt`
    /// rather than deleted, so a bug here never silently destroys the user's
    /// saved spot.
    pub fn open_or_default(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::open(path.as_path()) {
            Ok(store) => store,
            Err(SettingsError::Corrupt(e)) => {
                warn!("settings file {} is corrupt ({e}); starting fresh", path.display());
                quarantine(&path);
                Self {
                    path,
                    values: BTreeMap::new(),
                }
            }
            Err(e) => {
                warn!("could not read settings file {} ({e}); starting fresh", path.display());
                Self {
                    path,
                    values: BTreeMap::new(),
                }
            }
        }
    }

    fn persist(&self) -> Result<(), SettingsError> {
        let bytes = serde_json::to_vec_pretty(&self.values)?;
        atomic_write(&self.path, &bytes)?;
        Ok(())
    }

    /// Write-through set. On failure the in-memory value is rolled back so
    /// this store always mirrors what the file actually holds.
    fn write(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        let previous = self.values.insert(key.to_string(), value);
        if let Err(e) = self.persist() {
            match previous {
                Some(prev) => self.values.insert(key.to_string(), prev),
                None => self.values.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

fn quarantine(path: &Path) {
    let mut quarantined = path.as_os_str().to_os_string();
    quarantined.push(".corrupt");
    if let Err(e) = fs::rename(path, &quarantined) {
        warn!("could not quarantine corrupt settings file: {e}");
    }
}

impl SettingsStore for JsonFileSettings {
    fn get_f64(&self, key: &str) -> Option<f64> {
        self.values.get(key)?.as_f64()
    }

    fn set_f64(&mut self, key: &str, value: f64) -> Result<(), SettingsError> {
        self.write(key, serde_json::Value::from(value))
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key)?.as_bool()
    }

    fn set_bool(&mut self, key: &str, value: bool) -> Result<(), SettingsError> {
        self.write(key, serde_json::Value::from(value))
    }
}
