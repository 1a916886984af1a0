//! Checksum computation and verification
//!
//! Streaming digest helpers behind a single [`HashAlgorithm`] enum. A
//! retrieval can carry any number of [`DigestExpectation`]s; all of them
//! must match.

use crate::error::ToolError;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Chunk size for reading files during hashing (1MB)
const CHUNK_SIZE: usize = 1024 * 1024;

/// Threshold for showing progress (100MB)
const PROGRESS_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Supported hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md5,
    Sha256,
    Sha512,
    Sha3_256,
    Blake3,
}

impl HashAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
            Self::Sha3_256 => "SHA3-256",
            Self::Blake3 => "BLAKE3",
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            "sha3-256" | "sha3_256" | "sha3" => Ok(Self::Sha3_256),
            "blake3" => Ok(Self::Blake3),
            _ => Err(ToolError::UnknownAlgorithm {
                name: s.to_string(),
            }),
        }
    }
}

/// An algorithm-tagged digest a retrieved file must match.
#[derive(Debug, Clone)]
pub struct DigestExpectation {
    pub algorithm: HashAlgorithm,
    pub expected: String,
}

impl DigestExpectation {
    pub fn new(algorithm: HashAlgorithm, expected: impl Into<String>) -> Self {
        Self {
            algorithm,
            expected: expected.into(),
        }
    }
}

/// Compute a file's digest under `algorithm`, as lowercase hex.
///
/// Shows coarse percent progress for files larger than 100MB.
pub fn hash_file(algorithm: HashAlgorithm, file: &Path) -> Result<String, ToolError> {
    let mut f = std::fs::File::open(file)
        .map_err(|e| ToolError::io(format!("cannot open file {}", file.display()), e))?;

    let file_size = f.metadata().map(|m| m.len()).unwrap_or(0);
    let show_progress = file_size > PROGRESS_THRESHOLD;

    match algorithm {
        HashAlgorithm::Md5 => hash_with_progress::<md5::Md5>(&mut f, file_size, show_progress),
        HashAlgorithm::Sha256 => {
            hash_with_progress::<sha2::Sha256>(&mut f, file_size, show_progress)
        }
        HashAlgorithm::Sha512 => {
            hash_with_progress::<sha2::Sha512>(&mut f, file_size, show_progress)
        }
        HashAlgorithm::Sha3_256 => {
            hash_with_progress::<sha3::Sha3_256>(&mut f, file_size, show_progress)
        }
        HashAlgorithm::Blake3 => hash_blake3_with_progress(&mut f, file_size, show_progress),
    }
}

/// Verify a file's digest against an expected value.
///
/// Hex comparison is case-insensitive. The file is never modified or
/// deleted, whichever way the check goes.
///
/// # Example
/// ```ignore
/// checksum_file(HashAlgorithm::Sha256, Path::new("/tmp/foo.tar.gz"), "abc123...")?;
/// ```
pub fn checksum_file(
    algorithm: HashAlgorithm,
    file: &Path,
    expected: &str,
) -> Result<(), ToolError> {
    let actual = hash_file(algorithm, file)?;
    let expected = expected.to_lowercase();

    if actual != expected {
        return Err(ToolError::Integrity {
            algorithm: algorithm.name(),
            path: file.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Verify every expectation in turn; all must match.
pub fn verify_expectations(
    file: &Path,
    expectations: &[DigestExpectation],
) -> Result<(), ToolError> {
    for expectation in expectations {
        checksum_file(expectation.algorithm, file, &expectation.expected)?;
    }
    Ok(())
}

/// Compute hash via the RustCrypto Digest trait (MD5, SHA2, SHA3)
fn hash_with_progress<D: sha2::Digest>(
    reader: &mut impl Read,
    file_size: u64,
    show_progress: bool,
) -> Result<String, ToolError> {
    let mut hasher = D::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut total_read = 0u64;
    let mut last_percent = 0u8;

    loop {
        let n = reader
            .read(&mut buffer)
            .map_err(|e| ToolError::io("read error while hashing", e))?;
        if n == 0 {
            break;
        }

        hasher.update(&buffer[..n]);
        total_read += n as u64;

        if show_progress && file_size > 0 {
            let percent = ((total_read * 100) / file_size) as u8;
            if percent >= last_percent + 10 {
                print!("\r     checksum: {}%...", percent);
                std::io::Write::flush(&mut std::io::stdout()).ok();
                last_percent = percent;
            }
        }
    }

    if show_progress {
        println!();
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Compute BLAKE3 hash (separate implementation due to different API)
fn hash_blake3_with_progress(
    reader: &mut impl Read,
    file_size: u64,
    show_progress: bool,
) -> Result<String, ToolError> {
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut total_read = 0u64;
    let mut last_percent = 0u8;

    loop {
        let n = reader
            .read(&mut buffer)
            .map_err(|e| ToolError::io("read error while hashing", e))?;
        if n == 0 {
            break;
        }

        hasher.update(&buffer[..n]);
        total_read += n as u64;

        if show_progress && file_size > 0 {
            let percent = ((total_read * 100) / file_size) as u8;
            if percent >= last_percent + 10 {
                print!("\r     checksum: {}%...", percent);
                std::io::Write::flush(&mut std::io::stdout()).ok();
                last_percent = percent;
            }
        }
    }

    if show_progress {
        println!();
    }

    Ok(hasher.finalize().to_hex().to_string())
}

/// Compute all common hashes for a file at once (for `rtool hash`).
pub fn compute_all_hashes(file: &Path) -> Result<FileHashes, ToolError> {
    use sha2::Digest;

    let mut f = std::fs::File::open(file)
        .map_err(|e| ToolError::io(format!("cannot open file {}", file.display()), e))?;

    let mut md5_hasher = md5::Md5::new();
    let mut sha256_hasher = sha2::Sha256::new();
    let mut sha512_hasher = sha2::Sha512::new();
    let mut blake3_hasher = blake3::Hasher::new();
    let mut buffer = [0u8; 8192];

    loop {
        let n = f
            .read(&mut buffer)
            .map_err(|e| ToolError::io("read error while hashing", e))?;
        if n == 0 {
            break;
        }
        md5_hasher.update(&buffer[..n]);
        sha256_hasher.update(&buffer[..n]);
        sha512_hasher.update(&buffer[..n]);
        blake3_hasher.update(&buffer[..n]);
    }

    Ok(FileHashes {
        md5: hex::encode(md5_hasher.finalize()),
        sha256: hex::encode(sha256_hasher.finalize()),
        sha512: hex::encode(sha512_hasher.finalize()),
        blake3: blake3_hasher.finalize().to_hex().to_string(),
    })
}

/// Container for computed file hashes
#[derive(Debug, Clone)]
pub struct FileHashes {
    pub md5: String,
    pub sha256: String,
    pub sha512: String,
    pub blake3: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
    const HELLO_MD5: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";
    const HELLO_BLAKE3: &str = "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24";
    const HELLO_SHA3_256: &str =
        "644bcc7e564373040999aac89e7622f3ca71fba1d972fd94a31c3bfbf24e3938";

    fn hello_file() -> (tempfile::TempDir, std::path::PathBuf) {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        std::fs::write(&file_path, b"hello world").unwrap();
        (temp_dir, file_path)
    }

    #[test]
    fn test_checksum_sha256() {
        let (_t, file_path) = hello_file();
        checksum_file(HashAlgorithm::Sha256, &file_path, HELLO_SHA256).unwrap();
    }

    #[test]
    fn test_checksum_sha256_mismatch() {
        let (_t, file_path) = hello_file();

        let result = checksum_file(HashAlgorithm::Sha256, &file_path, "wrong_hash");
        match result {
            Err(ToolError::Integrity {
                algorithm,
                expected,
                actual,
                ..
            }) => {
                assert_eq!(algorithm, "SHA256");
                assert_eq!(expected, "wrong_hash");
                assert_eq!(actual, HELLO_SHA256);
            }
            other => panic!("expected Integrity error, got {:?}", other),
        }

        // The file is preserved for inspection.
        assert_eq!(std::fs::read(&file_path).unwrap(), b"hello world");
    }

    #[test]
    fn test_checksum_md5() {
        let (_t, file_path) = hello_file();
        checksum_file(HashAlgorithm::Md5, &file_path, HELLO_MD5).unwrap();
    }

    #[test]
    fn test_checksum_blake3() {
        let (_t, file_path) = hello_file();
        checksum_file(HashAlgorithm::Blake3, &file_path, HELLO_BLAKE3).unwrap();
    }

    #[test]
    fn test_checksum_sha3_256() {
        let (_t, file_path) = hello_file();
        checksum_file(HashAlgorithm::Sha3_256, &file_path, HELLO_SHA3_256).unwrap();
    }

    #[test]
    fn test_case_insensitive_comparison() {
        let (_t, file_path) = hello_file();
        checksum_file(
            HashAlgorithm::Sha256,
            &file_path,
            &HELLO_SHA256.to_uppercase(),
        )
        .unwrap();
    }

    #[test]
    fn test_verify_expectations_conjunction() {
        let (_t, file_path) = hello_file();

        verify_expectations(
            &file_path,
            &[
                DigestExpectation::new(HashAlgorithm::Sha256, HELLO_SHA256),
                DigestExpectation::new(HashAlgorithm::Md5, HELLO_MD5),
            ],
        )
        .unwrap();

        // One bad expectation fails the whole conjunction.
        let result = verify_expectations(
            &file_path,
            &[
                DigestExpectation::new(HashAlgorithm::Sha256, HELLO_SHA256),
                DigestExpectation::new(HashAlgorithm::Md5, "0000"),
            ],
        );
        assert!(matches!(result, Err(ToolError::Integrity { .. })));
    }

    #[test]
    fn test_compute_all_hashes() {
        let (_t, file_path) = hello_file();

        let hashes = compute_all_hashes(&file_path).unwrap();
        assert_eq!(hashes.md5, HELLO_MD5);
        assert_eq!(hashes.sha256, HELLO_SHA256);
        assert_eq!(hashes.blake3, HELLO_BLAKE3);
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("sha256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("SHA256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("md5".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Md5);
        assert_eq!("sha3-256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha3_256);
        assert_eq!("blake3".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Blake3);

        let err = "whirlpool".parse::<HashAlgorithm>().unwrap_err();
        assert!(matches!(err, ToolError::UnknownAlgorithm { name } if name == "whirlpool"));
    }

    #[test]
    fn test_hash_missing_file() {
        let result = hash_file(HashAlgorithm::Sha256, Path::new("/nonexistent/file"));
        assert!(matches!(result, Err(ToolError::Io { .. })));
    }
}
