//! Native archive extraction
//!
//! Format dispatch is by filename suffix, longest-known-suffix-first, over
//! an ordered table: adding a format is a new table row, not a new branch.
//! Extraction happens in-process (no external tar/unzip needed) and is
//! entry-wise so callers get back the extracted path set.

use crate::error::ToolError;
use crate::internal::fs_utils;
use crate::internal::progress::{self, ProgressGuard};
use crate::output;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Recognized archive container/compression combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    TarXz,
    TarBz2,
    TarZst,
    Tar,
    Zip,
}

/// Suffix dispatch table, ordered longest-first so compound suffixes win.
const SUFFIXES: &[(&str, ArchiveKind)] = &[
    (".tar.bz2", ArchiveKind::TarBz2),
    (".tar.zst", ArchiveKind::TarZst),
    (".tar.gz", ArchiveKind::TarGz),
    (".tar.xz", ArchiveKind::TarXz),
    (".tbz2", ArchiveKind::TarBz2),
    (".tzst", ArchiveKind::TarZst),
    (".tgz", ArchiveKind::TarGz),
    (".txz", ArchiveKind::TarXz),
    (".tar", ArchiveKind::Tar),
    (".zip", ArchiveKind::Zip),
];

/// Decide the archive kind from a filename, longest suffix first.
///
/// # Example
/// ```
/// use recipe_tools::unpack::{ArchiveKind, detect};
///
/// assert_eq!(detect("foo-1.0.tar.gz"), Some(ArchiveKind::TarGz));
/// assert_eq!(detect("foo-1.0.bin"), None);
/// ```
pub fn detect(filename: &str) -> Option<ArchiveKind> {
    let lower = filename.to_lowercase();
    SUFFIXES
        .iter()
        .find(|(suffix, _)| lower.ends_with(suffix))
        .map(|(_, kind)| *kind)
}

/// Extract `archive` into `dest_dir`, returning the extracted paths.
///
/// An unrecognized suffix raises [`ToolError::UnsupportedFormat`] without
/// touching the archive. Entries that would escape the destination are
/// rejected.
pub fn unpack(archive: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>, ToolError> {
    let filename = archive
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| archive.display().to_string());

    let kind = detect(&filename).ok_or_else(|| ToolError::UnsupportedFormat {
        filename: filename.clone(),
    })?;

    fs_utils::ensure_dir(dest_dir)?;

    let file = File::open(archive)
        .map_err(|e| ToolError::io(format!("cannot open archive {}", archive.display()), e))?;

    let pb = progress::create_spinner(&format!("extracting {}", filename));
    let _guard = ProgressGuard::new(&pb);

    let extracted = match kind {
        ArchiveKind::TarGz => {
            let reader = BufReader::new(file);
            unpack_tar(flate2::read::GzDecoder::new(reader), archive, dest_dir)?
        }
        ArchiveKind::TarXz => {
            let reader = BufReader::new(file);
            unpack_tar(xz2::read::XzDecoder::new(reader), archive, dest_dir)?
        }
        ArchiveKind::TarBz2 => {
            let reader = BufReader::new(file);
            unpack_tar(bzip2::read::BzDecoder::new(reader), archive, dest_dir)?
        }
        ArchiveKind::TarZst => {
            let reader = BufReader::new(file);
            let decoder = zstd::stream::read::Decoder::new(reader)
                .map_err(|e| unpack_error(archive, &e))?;
            unpack_tar(decoder, archive, dest_dir)?
        }
        ArchiveKind::Tar => unpack_tar(BufReader::new(file), archive, dest_dir)?,
        ArchiveKind::Zip => unpack_zip(file, archive, dest_dir)?,
    };

    output::detail(&format!("extracted {} ({} entries)", filename, extracted.len()));
    Ok(extracted)
}

fn unpack_error(archive: &Path, reason: &dyn std::fmt::Display) -> ToolError {
    ToolError::Unpack {
        path: archive.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn unpack_tar<R: Read>(
    reader: R,
    archive: &Path,
    dest_dir: &Path,
) -> Result<Vec<PathBuf>, ToolError> {
    let mut tar = tar::Archive::new(reader);
    let mut extracted = Vec::new();

    let entries = tar.entries().map_err(|e| unpack_error(archive, &e))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| unpack_error(archive, &e))?;
        let rel = entry
            .path()
            .map_err(|e| unpack_error(archive, &e))?
            .to_path_buf();

        // unpack_in refuses entries that resolve outside dest_dir.
        if !entry
            .unpack_in(dest_dir)
            .map_err(|e| unpack_error(archive, &e))?
        {
            return Err(unpack_error(
                archive,
                &format!("entry escapes destination: {}", rel.display()),
            ));
        }
        extracted.push(dest_dir.join(rel));
    }

    Ok(extracted)
}

fn unpack_zip(file: File, archive: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>, ToolError> {
    let mut zip = zip::ZipArchive::new(file).map_err(|e| unpack_error(archive, &e))?;
    let mut extracted = Vec::with_capacity(zip.len());

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|e| unpack_error(archive, &e))?;

        let Some(rel) = entry.enclosed_name() else {
            let name = entry.name().to_string();
            return Err(unpack_error(
                archive,
                &format!("entry escapes destination: {name}"),
            ));
        };
        let out = dest_dir.join(&rel);

        if entry.is_dir() {
            fs_utils::ensure_dir(&out)?;
        } else {
            fs_utils::ensure_parent_dir(&out)?;
            let mut out_file = File::create(&out)
                .map_err(|e| ToolError::io(format!("cannot create {}", out.display()), e))?;
            std::io::copy(&mut entry, &mut out_file)
                .map_err(|e| ToolError::io(format!("cannot write {}", out.display()), e))?;

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(&out, std::fs::Permissions::from_mode(mode))
                    .map_err(|e| ToolError::io(format!("cannot chmod {}", out.display()), e))?;
            }
        }

        extracted.push(out);
    }

    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_tar_gz(path: &Path, entries: &[(&str, &str)]) {
        let gz = flate2::write::GzEncoder::new(
            File::create(path).unwrap(),
            flate2::Compression::default(),
        );
        let mut builder = tar::Builder::new(gz);
        for (name, contents) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, name, contents.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, contents) in entries {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_detect_compound_suffixes() {
        assert_eq!(detect("foo.tar.gz"), Some(ArchiveKind::TarGz));
        assert_eq!(detect("foo.tgz"), Some(ArchiveKind::TarGz));
        assert_eq!(detect("foo.tar.xz"), Some(ArchiveKind::TarXz));
        assert_eq!(detect("foo.txz"), Some(ArchiveKind::TarXz));
        assert_eq!(detect("foo.tar.bz2"), Some(ArchiveKind::TarBz2));
        assert_eq!(detect("foo.tbz2"), Some(ArchiveKind::TarBz2));
        assert_eq!(detect("foo.tar.zst"), Some(ArchiveKind::TarZst));
        assert_eq!(detect("foo.tzst"), Some(ArchiveKind::TarZst));
        assert_eq!(detect("foo.tar"), Some(ArchiveKind::Tar));
        assert_eq!(detect("foo.zip"), Some(ArchiveKind::Zip));
    }

    #[test]
    fn test_detect_is_case_insensitive() {
        assert_eq!(detect("FOO.TAR.GZ"), Some(ArchiveKind::TarGz));
        assert_eq!(detect("Foo.Zip"), Some(ArchiveKind::Zip));
    }

    #[test]
    fn test_detect_unknown_suffix() {
        assert_eq!(detect("foo.bin"), None);
        assert_eq!(detect("foo.gz"), None);
        assert_eq!(detect("foo"), None);
    }

    #[test]
    fn test_unpack_tar_gz() {
        let temp = tempdir().unwrap();
        let archive = temp.path().join("pkg.tar.gz");
        write_tar_gz(
            &archive,
            &[
                ("pkg-1.0/README", "read me\n"),
                ("pkg-1.0/src/main.c", "int main(void) { return 0; }\n"),
            ],
        );

        let dest = temp.path().join("out");
        let extracted = unpack(&archive, &dest).unwrap();

        assert_eq!(extracted.len(), 2);
        assert_eq!(
            std::fs::read_to_string(dest.join("pkg-1.0/README")).unwrap(),
            "read me\n"
        );
        assert_eq!(
            std::fs::read_to_string(dest.join("pkg-1.0/src/main.c")).unwrap(),
            "int main(void) { return 0; }\n"
        );
    }

    #[test]
    fn test_unpack_zip() {
        let temp = tempdir().unwrap();
        let archive = temp.path().join("pkg.zip");
        write_zip(&archive, &[("docs/a.txt", "alpha"), ("docs/b.txt", "beta")]);

        let dest = temp.path().join("out");
        let extracted = unpack(&archive, &dest).unwrap();

        assert_eq!(extracted.len(), 2);
        assert_eq!(std::fs::read_to_string(dest.join("docs/a.txt")).unwrap(), "alpha");
        assert_eq!(std::fs::read_to_string(dest.join("docs/b.txt")).unwrap(), "beta");
    }

    #[test]
    fn test_unpack_unsupported_suffix() {
        let temp = tempdir().unwrap();
        let archive = temp.path().join("pkg.rar");
        std::fs::write(&archive, b"not an archive").unwrap();

        let result = unpack(&archive, temp.path());
        assert!(matches!(
            result,
            Err(ToolError::UnsupportedFormat { filename }) if filename == "pkg.rar"
        ));
        // The file itself is untouched.
        assert_eq!(std::fs::read(&archive).unwrap(), b"not an archive");
    }

    #[test]
    fn test_unpack_corrupt_tar_gz() {
        let temp = tempdir().unwrap();
        let archive = temp.path().join("pkg.tar.gz");
        std::fs::write(&archive, b"definitely not gzip data").unwrap();

        let result = unpack(&archive, &temp.path().join("out"));
        assert!(matches!(result, Err(ToolError::Unpack { .. })));
    }
}
