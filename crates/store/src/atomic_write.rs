//! Atomic file write using the write-rename pattern.
//!
//! The settings file is rewritten on every mutation, so a crash mid-write
//! must never corrupt the previous copy. Data goes to `{path}.tmp` first,
//! is flushed with `sync_all()`, then renamed over the final path.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically writes `data` to `path`.
///
/// The original file at `path` is untouched until the final rename, which
/// is atomic on POSIX and near-atomic on Windows.
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut tmp_path = PathBuf::from(path.as_os_str());
    tmp_path.set_extension(tmp_extension(path));

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// `foo.json` writes through `foo.json.tmp`, keeping the real extension
/// visible so leftover temp files are recognizable.
fn tmp_extension(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{ext}.tmp"),
        None => "tmp".to_string(),
    }
}
