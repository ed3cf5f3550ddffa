//! Whole-file writes that never leave a half-written target behind

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Write `content` to a sibling temp file, then rename it over `path`.
///
/// The temp file is removed when the rename fails.
pub fn write_atomically(path: &Path, content: &str) -> io::Result<()> {
    let temp_path = temp_path_for(path);

    fs::write(&temp_path, content)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    Ok(())
}

/// `dir/name.ext` -> `dir/.name.ext.tmp`
fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.tmp"))
}
