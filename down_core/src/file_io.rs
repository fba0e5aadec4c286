//! # Sheet File I/O
//!
//! Saves and loads allocation sheets as `.daf` files (pretty-printed JSON),
//! with two safety features:
//! - **Atomic saves**: write to a `.tmp` sibling, fsync, rename
//! - **Version validation**: schema compatibility checked on load
//!
//! ## Example
//!
//! ```rust,no_run
//! use down_core::file_io::{save_sheet, load_sheet};
//! use down_core::sheet::Sheet;
//! use std::path::Path;
//!
//! let sheet = Sheet::new();
//! let path = Path::new("order.daf");
//!
//! save_sheet(&sheet, path)?;
//! let loaded = load_sheet(path)?;
//! assert_eq!(loaded.order.style_number, sheet.order.style_number);
//! # Ok::<(), down_core::errors::AllocError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::errors::{AllocError, AllocResult};
use crate::sheet::{Sheet, SCHEMA_VERSION};

/// Save a sheet to a file with atomic write semantics.
///
/// The save process:
/// 1. Serialize the sheet to JSON
/// 2. Write to a temporary file (.tmp)
/// 3. Sync to disk (fsync)
/// 4. Rename .tmp to the target (atomic on most filesystems)
///
/// This prevents corruption if the process is interrupted during write.
///
/// # Example
///
/// ```rust,no_run
/// use down_core::file_io::save_sheet;
/// use down_core::sheet::Sheet;
/// use std::path::Path;
///
/// let sheet = Sheet::new();
/// save_sheet(&sheet, Path::new("order.daf"))?;
/// # Ok::<(), down_core::errors::AllocError>(())
/// ```
pub fn save_sheet(sheet: &Sheet, path: &Path) -> AllocResult<()> {
    let json = serde_json::to_string_pretty(sheet).map_err(|e| AllocError::SerializationError {
        reason: e.to_string(),
    })?;

    write_atomic(path, &json)?;
    log::info!("Saved sheet to {}", path.display());
    Ok(())
}

/// Load a sheet from a file.
///
/// # Returns
///
/// * `Ok(Sheet)` - Successfully loaded sheet
/// * `Err(AllocError::VersionMismatch)` - File version is incompatible
/// * `Err(AllocError::SerializationError)` - Invalid JSON
/// * `Err(AllocError::FileError)` - I/O error
pub fn load_sheet(path: &Path) -> AllocResult<Sheet> {
    let mut file = File::open(path)
        .map_err(|e| AllocError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| AllocError::file_error("read", path.display().to_string(), e.to_string()))?;

    let sheet: Sheet =
        serde_json::from_str(&contents).map_err(|e| AllocError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    validate_version(&sheet.meta.version)?;

    log::info!("Loaded sheet from {}", path.display());
    Ok(sheet)
}

/// Write a string to a file atomically: temp sibling, fsync, rename.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> AllocResult<()> {
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        AllocError::file_error(
            "create temp file",
            tmp_path.display().to_string(),
            e.to_string(),
        )
    })?;

    tmp_file.write_all(contents.as_bytes()).map_err(|e| {
        AllocError::file_error(
            "write temp file",
            tmp_path.display().to_string(),
            e.to_string(),
        )
    })?;

    tmp_file.sync_all().map_err(|e| {
        AllocError::file_error(
            "sync temp file",
            tmp_path.display().to_string(),
            e.to_string(),
        )
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        // Clean up temp file if rename fails
        let _ = fs::remove_file(&tmp_path);
        AllocError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Temp file path used during an atomic write
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let extension = tmp
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    tmp.set_extension(extension);
    tmp
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> AllocResult<()> {
    let file_parts: Vec<u32> = file_version
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(AllocError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: SCHEMA_VERSION.to_string(),
        });
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(AllocError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: SCHEMA_VERSION.to_string(),
        });
    }

    // For 0.x versions, a file newer than this library is rejected
    if current_parts[0] == 0 && file_parts.len() > 1 && current_parts.len() > 1 {
        if file_parts[1] > current_parts[1] {
            return Err(AllocError::VersionMismatch {
                file_version: file_version.to_string(),
                expected_version: SCHEMA_VERSION.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmp_path_generation() {
        let path = Path::new("/path/to/order.daf");
        assert_eq!(tmp_path_for(path), Path::new("/path/to/order.daf.tmp"));

        let bare = Path::new("/path/to/order");
        assert_eq!(tmp_path_for(bare), Path::new("/path/to/order.tmp"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.daf");

        let mut sheet = Sheet::new();
        sheet.set_buyer("northline");
        sheet.set_style_number("nl-2190");
        sheet.weights.down_g = 142.5;
        save_sheet(&sheet, &path).unwrap();

        let loaded = load_sheet(&path).unwrap();
        assert_eq!(loaded.order.buyer, "NORTHLINE");
        assert_eq!(loaded.order.style_number, "NL-2190");
        assert_eq!(loaded.weights.down_g, 142.5);
        assert_eq!(loaded.grid, sheet.grid);
    }

    #[test]
    fn test_atomic_save_leaves_no_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atomic.daf");
        let tmp_path = tmp_path_for(&path);

        save_sheet(&Sheet::new(), &path).unwrap();

        assert!(!tmp_path.exists());
        assert!(path.exists());
    }

    #[test]
    fn test_load_missing_file_is_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_sheet(&dir.path().join("absent.daf")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.5").is_ok());

        // Different major should fail
        assert!(validate_version("1.0.0").is_err());

        // Newer minor (in 0.x) should fail
        assert!(validate_version("0.2.0").is_err());

        // Garbage should fail
        assert!(validate_version("abc").is_err());
    }

    #[test]
    fn test_load_rejects_newer_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("newer.daf");

        let mut sheet = Sheet::new();
        sheet.meta.version = "1.0.0".to_string();
        save_sheet(&sheet, &path).unwrap();

        let err = load_sheet(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");
    }
}
