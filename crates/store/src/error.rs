// ---------------------------------------------------------------------------
// SettingsError: typed errors for settings reads and writes
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors that can occur while persisting settings.
///
/// Writes are surfaced as recoverable errors so the UI can warn the user
/// that a value was not saved instead of silently losing it.
#[derive(Debug)]
pub enum SettingsError {
    /// I/O error (permission denied, disk full, etc.)
    Io(std::io::Error),
    /// Serializing the settings map to JSON failed.
    Encode(String),
    /// The settings file exists but its content does not parse.
    Corrupt(String),
    /// Browser storage failed (quota exceeded, storage disabled).
    Storage(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "I/O error: {e}"),
            SettingsError::Encode(msg) => write!(f, "Encoding error: {msg}"),
            SettingsError::Corrupt(msg) => write!(f, "Corrupt settings: {msg}"),
            SettingsError::Storage(msg) => write!(f, "Storage error: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Encode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_io() {
        let err = SettingsError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let msg = format!("{err}");
        assert!(msg.contains("I/O error"), "got: {msg}");
        assert!(msg.contains("denied"), "got: {msg}");
    }

    #[test]
    fn test_display_storage() {
        let err = SettingsError::Storage("quota exceeded".to_string());
        let msg = format!("{err}");
        assert!(msg.contains("Storage error"), "got: {msg}");
        assert!(msg.contains("quota exceeded"), "got: {msg}");
    }

    #[test]
    fn test_display_corrupt() {
        let err = SettingsError::Corrupt("expected value at line 1".to_string());
        let msg = format!("{err}");
        assert!(msg.contains("Corrupt settings"), "got: {msg}");
    }

    #[test]
    fn test_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: SettingsError = io_err.into();
        assert!(matches!(err, SettingsError::Io(_)));
    }

    #[test]
    fn test_source_chains_io() {
        let err = SettingsError::Io(std::io::Error::new(std::io::ErrorKind::Other, "test"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
