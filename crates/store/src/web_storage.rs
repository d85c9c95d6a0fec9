//! localStorage settings backend for web builds.
//!
//! The values here are a handful of short strings, well inside the ~5 MB
//! localStorage limit, so the synchronous API is fine and nothing needs
//! IndexedDB. Keys are namespaced with a `parkmark.` prefix to keep the
//! origin's storage tidy.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{DomException, Storage};

use crate::error::SettingsError;
use crate::settings::SettingsStore;

const KEY_PREFIX: &str = "parkmark.";

/// Check whether a JsValue represents a QuotaExceededError.
fn is_quota_exceeded_error(err: &JsValue) -> bool {
    if let Ok(dom_exception) = err.clone().dyn_into::<DomException>() {
        return dom_exception.name() == "QuotaExceededError";
    }
    let s = format!("{err:?}");
    s.contains("QuotaExceededError") || s.contains("quota")
}

fn storage() -> Result<Storage, SettingsError> {
    let window =
        web_sys::window().ok_or_else(|| SettingsError::Storage("no window".to_string()))?;
    window
        .local_storage()
        .map_err(|e| SettingsError::Storage(format!("localStorage error: {e:?}")))?
        .ok_or_else(|| SettingsError::Storage("localStorage not available".to_string()))
}

/// Settings store backed by the browser's localStorage.
pub struct WebStorageSettings;

impl WebStorageSettings {
    fn get_raw(&self, key: &str) -> Option<String> {
        let storage = storage().ok()?;
        storage.get_item(&format!("{KEY_PREFIX}{key}")).ok()?
    }

    fn set_raw(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let storage = storage()?;
        storage
            .set_item(&format!("{KEY_PREFIX}{key}"), value)
            .map_err(|e| {
                if is_quota_exceeded_error(&e) {
                    SettingsError::Storage("browser storage is full".to_string())
                } else {
                    SettingsError::Storage(format!("set failed: {e:?}"))
                }
            })
    }
}

impl SettingsStore for WebStorageSettings {
    fn get_f64(&self, key: &str) -> Option<f64> {
        self.get_raw(key)?.parse().ok()
    }

    fn set_f64(&mut self, key: &str, value: f64) -> Result<(), SettingsError> {
        self.set_raw(key, &value.to_string())
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_raw(key)?.parse().ok()
    }

    fn set_bool(&mut self, key: &str, value: bool) -> Result<(), SettingsError> {
        self.set_raw(key, &value.to_string())
    }
}
