//! Common filesystem utilities
//!
//! Shared filesystem operations used by the acquire and unpack helpers.

use crate::error::ToolError;
use std::path::Path;

/// Ensure a file's parent directory exists.
///
/// Creates the parent directory (and all ancestors) if it doesn't exist.
///
/// # Example
/// ```ignore
/// ensure_parent_dir(Path::new("/foo/bar/baz.txt"))?;
/// // /foo/bar/ now exists
/// ```
pub fn ensure_parent_dir(path: &Path) -> Result<(), ToolError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| ToolError::io(format!("cannot create directory {}", parent.display()), e))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it and all ancestors if needed.
pub fn ensure_dir(dir: &Path) -> Result<(), ToolError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .map_err(|e| ToolError::io(format!("cannot create directory {}", dir.display()), e))?;
    }
    Ok(())
}

/// Check that `needed` bytes fit in the free space at `path`.
///
/// An unreadable filesystem is a warning, not a failure; pass the
/// destination directory, not the file.
pub fn check_disk_space(path: &Path, needed: u64) -> Result<(), ToolError> {
    match fs2::available_space(path) {
        Ok(available) if available < needed => Err(ToolError::DiskSpace {
            path: path.to_path_buf(),
            needed,
            available,
        }),
        Ok(_) => Ok(()),
        Err(_) => {
            crate::output::warning(&format!(
                "could not check disk space for {}",
                path.display()
            ));
            Ok(())
        }
    }
}
