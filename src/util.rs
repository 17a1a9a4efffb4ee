//! Utility functions for viewkit.
//!
//! Size-limited reads and atomic JSON writes shared by the role registry
//! file and the layout file.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::{Result, ViewkitError};

/// Maximum file size that can be read into memory (10 MB).
///
/// Role and layout files are tiny; anything larger is almost certainly the
/// wrong file.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MB

/// Read a file into a string with size limit protection.
///
/// # Errors
///
/// Returns an error if:
/// * The file cannot be read (doesn't exist, permission denied, etc.)
/// * The file exceeds `MAX_FILE_SIZE`
pub fn read_to_string_limited(path: &Path) -> Result<String> {
    read_to_string_with_limit(path, MAX_FILE_SIZE)
}

/// Read a file into a string with a custom size limit.
pub fn read_to_string_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| ViewkitError::storage(path, e))?;

    let size = metadata.len();
    if size > max_size {
        return Err(ViewkitError::storage(
            path,
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("file is too large ({} bytes, max {} bytes)", size, max_size),
            ),
        ));
    }

    fs::read_to_string(path).map_err(|e| ViewkitError::storage(path, e))
}

/// Serialize `value` as pretty JSON and write it atomically.
///
/// Writes to a dot-prefixed temp file beside `path`, syncs, then renames.
/// Creates the parent directory if needed.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = parent {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| ViewkitError::storage(dir, e))?;
        }
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ViewkitError::config(format!("not a file path: {}", path.display())))?;
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    {
        let mut file =
            fs::File::create(&temp_path).map_err(|e| ViewkitError::storage(&temp_path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| ViewkitError::storage(&temp_path, e))?;
        file.sync_all()
            .map_err(|e| ViewkitError::storage(&temp_path, e))?;
    }

    // Rename temp file to final path (atomic on POSIX)
    fs::rename(&temp_path, path).map_err(|e| ViewkitError::storage(path, e))?;

    Ok(())
}
