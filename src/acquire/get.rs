//! Combined fetch + verify + unpack
//!
//! The convenience operation recipes use most: download an archive into the
//! destination directory, verify it, extract it, and drop the archive
//! artifact so only the extracted tree remains.

use crate::error::ToolError;
use crate::internal::{fs_utils, url_utils};
use crate::output;
use crate::unpack;
use std::path::{Path, PathBuf};

use super::download::{DownloadOptions, download};

/// Fetch an archive and unpack it into `dest_dir`.
///
/// The archive's filename is derived from the URL. Its format is decided by
/// filename suffix after the download completes; an unrecognized suffix
/// raises [`ToolError::UnsupportedFormat`] and leaves the downloaded file in
/// place for inspection, like an integrity failure would. On success the
/// archive artifact is removed and the extracted paths are returned.
///
/// # Example
/// ```no_run
/// use recipe_tools::acquire::{DownloadOptions, fetch_and_unpack};
/// use std::path::Path;
///
/// # fn main() -> Result<(), recipe_tools::ToolError> {
/// let extracted = fetch_and_unpack(
///     "https://ftp.gnu.org/gnu/bash/bash-5.2.26.tar.gz",
///     Path::new("/tmp/build"),
///     &DownloadOptions::default(),
/// )?;
/// println!("{} entries extracted", extracted.len());
/// # Ok(())
/// # }
/// ```
pub fn fetch_and_unpack(
    url: &str,
    dest_dir: &Path,
    options: &DownloadOptions,
) -> Result<Vec<PathBuf>, ToolError> {
    fs_utils::ensure_dir(dest_dir)?;

    let filename = url_utils::extract_filename(url);
    let archive = dest_dir.join(&filename);

    download(url, &archive, options)?;

    let extracted = unpack::unpack(&archive, dest_dir)?;

    std::fs::remove_file(&archive)
        .map_err(|e| ToolError::io(format!("cannot remove archive {}", archive.display()), e))?;
    output::detail(&format!("removed {}", filename));

    Ok(extracted)
}
