//! Key-value settings abstraction behind the parking pin.
//!
//! The pin persists through a small typed key-value interface rather than a
//! bespoke file format, so the backing store can be swapped per platform
//! (JSON file on desktop, localStorage on web, in-memory fake in tests).

use bevy::prelude::*;

use crate::error::SettingsError;

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// The three keys the pin owns in the settings store.
pub const KEY_PIN_LATITUDE: &str = "pin.latitude";
pub const KEY_PIN_LONGITUDE: &str = "pin.longitude";
pub const KEY_PIN_PRESENT: &str = "pin.present";

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Typed get/set by key. Writes are durable before returning.
///
/// Reads return `None` both for missing keys and for values of the wrong
/// type; callers treat either as "never written".
pub trait SettingsStore: Send + Sync + 'static {
    fn get_f64(&self, key: &str) -> Option<f64>;
    fn set_f64(&mut self, key: &str, value: f64) -> Result<(), SettingsError>;
    fn get_bool(&self, key: &str) -> Option<bool>;
    fn set_bool(&mut self, key: &str, value: bool) -> Result<(), SettingsError>;
}

/// The settings backend as a resource. Installed by the app shell before
/// [`crate::StorePlugin`]; tests and stripped-down builds get an in-memory
/// fallback.
#[derive(Resource)]
pub struct PinStorage(pub Box<dyn SettingsStore>);

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Non-durable store for tests and as a fallback when no backend is set up.
#[derive(Default)]
pub struct MemorySettings {
    values: std::collections::BTreeMap<String, serde_json::Value>,
    fail_writes: bool,
}

impl MemorySettings {
    /// When set, every write fails, for exercising the save-failed path.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    fn write(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if self.fail_writes {
            return Err(SettingsError::Storage("simulated write failure".to_string()));
        }
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

impl SettingsStore for MemorySettings {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_round_trips_typed_values() {
        let mut store = MemorySettings::default();
        store.set_f64(KEY_PIN_LATITUDE, 40.7128).unwrap();
        store.set_bool(KEY_PIN_PRESENT, true).unwrap();

        assert_eq!(store.get_f64(KEY_PIN_LATITUDE), Some(40.7128));
        assert_eq!(store.get_bool(KEY_PIN_PRESENT), Some(true));
    }

    #[test]
    fn test_missing_keys_read_as_none() {
        let store = MemorySettings::default();
        assert_eq!(store.get_f64(KEY_PIN_LATITUDE), None);
        assert_eq!(store.get_bool(KEY_PIN_PRESENT), None);
    }

    #[test]
    fn test_wrong_type_reads_as_none() {
        let mut store = MemorySettings::default();
        store.set_bool(KEY_PIN_LATITUDE, true).unwrap();
        assert_eq!(store.get_f64(KEY_PIN_LATITUDE), None);
    }

    #[test]
    fn test_last_write_wins() {
        let mut store = MemorySettings::default();
        store.set_f64(KEY_PIN_LONGITUDE, -74.0060).unwrap();
        store.set_f64(KEY_PIN_LONGITUDE, -99.1332).unwrap();
        assert_eq!(store.get_f64(KEY_PIN_LONGITUDE), Some(-99.1332));
    }

    #[test]
    fn test_simulated_write_failure() {
        let mut store = MemorySettings::default();
        store.set_f64(KEY_PIN_LATITUDE, 1.0).unwrap();
        store.set_fail_writes(true);

        assert!(store.set_f64(KEY_PIN_LATITUDE, 2.0).is_err());
        // Failed write must not clobber the stored value.
        assert_eq!(store.get_f64(KEY_PIN_LATITUDE), Some(1.0));
    }
}
