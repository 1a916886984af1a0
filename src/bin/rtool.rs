//! rtool CLI - recipe helper toolkit
//!
//! Usage:
//!   rtool download <url> [dest]        Download a file with retry + verification
//!   rtool get <url>                    Fetch an archive, verify, unpack, drop it
//!   rtool checksum <algo> <file> <hex> Verify a file against an expected digest
//!   rtool hash <file>                  Print all digests of a file
//!   rtool unpack <archive>             Extract an archive

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use recipe_tools::acquire::{
    self, BasicAuth, DigestExpectation, DownloadOptions, HashAlgorithm, filename_from_url,
};
use recipe_tools::{output, unpack};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "rtool")]
#[command(about = "Recipe helper toolkit: verified downloads, checksums, archive unpack")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by the download-shaped subcommands.
#[derive(Args)]
struct FetchArgs {
    /// Expected SHA256 digest
    #[arg(long, value_name = "HEX")]
    sha256: Option<String>,

    /// Additional digest expectation as ALGO:HEX (repeatable)
    #[arg(long, value_name = "ALGO:HEX")]
    checksum: Vec<String>,

    /// Total download attempts
    #[arg(long, default_value_t = 3)]
    retry: u32,

    /// Seconds to wait between attempts
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    retry_wait: u64,

    /// Replace the destination if it already exists
    #[arg(long)]
    overwrite: bool,

    /// Extra request header as "Name: value" (repeatable)
    #[arg(long, value_name = "HEADER")]
    header: Vec<String>,

    /// Basic-auth username
    #[arg(long, requires = "password")]
    user: Option<String>,

    /// Basic-auth password
    #[arg(long, requires = "user", env = "RTOOL_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a file from a URL
    Download {
        url: String,

        /// Destination path (defaults to the URL's filename in the current directory)
        dest: Option<PathBuf>,

        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Fetch an archive, verify it, unpack it, and drop the archive
    Get {
        url: String,

        /// Directory to unpack into
        #[arg(short = 'd', long, default_value = ".")]
        dest_dir: PathBuf,

        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Verify a file against an expected digest
    Checksum {
        /// Hash algorithm (md5, sha256, sha512, sha3-256, blake3)
        algorithm: String,
        file: PathBuf,
        expected: String,
    },

    /// Print all digests of a file
    Hash { file: PathBuf },

    /// Extract an archive
    Unpack {
        archive: PathBuf,

        /// Directory to unpack into
        #[arg(short = 'd', long, default_value = ".")]
        dest_dir: PathBuf,
    },
}

impl FetchArgs {
    fn to_options(&self) -> Result<DownloadOptions> {
        let mut verify = Vec::new();
        if let Some(hex) = &self.sha256 {
            verify.push(DigestExpectation::new(HashAlgorithm::Sha256, hex));
        }
        for entry in &self.checksum {
            let Some((algo, hex)) = entry.split_once(':') else {
                bail!("invalid --checksum '{entry}', expected ALGO:HEX");
            };
            let algorithm: HashAlgorithm = algo.trim().parse()?;
            verify.push(DigestExpectation::new(algorithm, hex.trim()));
        }

        let mut headers = Vec::new();
        for header in &self.header {
            let Some((name, value)) = header.split_once(':') else {
                bail!("invalid --header '{header}', expected 'Name: value'");
            };
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }

        let auth = match (&self.user, &self.password) {
            (Some(user), Some(password)) => Some(BasicAuth::new(user, password)),
            _ => None,
        };

        Ok(DownloadOptions {
            verify,
            retry: self.retry,
            retry_wait: Duration::from_secs(self.retry_wait),
            overwrite: self.overwrite,
            auth,
            headers,
            quiet: self.quiet,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Download { url, dest, fetch } => {
            let options = fetch.to_options()?;
            let dest = dest.unwrap_or_else(|| PathBuf::from(filename_from_url(&url)));

            output::action(&format!("Downloading {}", url));
            let bytes = acquire::download(&url, &dest, &options)
                .with_context(|| format!("download of {} failed", url))?;
            output::success(&format!("{} ({} bytes)", dest.display(), bytes));
        }

        Commands::Get { url, dest_dir, fetch } => {
            let options = fetch.to_options()?;

            output::action(&format!("Fetching {}", url));
            let extracted = acquire::fetch_and_unpack(&url, &dest_dir, &options)
                .with_context(|| format!("fetch of {} failed", url))?;
            output::success(&format!(
                "{} entries unpacked into {}",
                extracted.len(),
                dest_dir.display()
            ));
        }

        Commands::Checksum {
            algorithm,
            file,
            expected,
        } => {
            let algorithm: HashAlgorithm = algorithm.parse()?;
            acquire::checksum_file(algorithm, &file, &expected)?;
            output::success(&format!("{}: {} OK", file.display(), algorithm.name()));
        }

        Commands::Hash { file } => {
            let hashes = acquire::compute_all_hashes(&file)
                .with_context(|| format!("cannot hash {}", file.display()))?;
            println!("md5:    {}", hashes.md5);
            println!("sha256: {}", hashes.sha256);
            println!("sha512: {}", hashes.sha512);
            println!("blake3: {}", hashes.blake3);
        }

        Commands::Unpack { archive, dest_dir } => {
            let extracted = unpack::unpack(&archive, &dest_dir)
                .with_context(|| format!("cannot unpack {}", archive.display()))?;
            output::success(&format!(
                "{} entries unpacked into {}",
                extracted.len(),
                dest_dir.display()
            ));
        }
    }

    Ok(())
}
