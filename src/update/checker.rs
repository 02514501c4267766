// file: src/update/checker.rs
// description: fetches the release manifest and downloads newer builds
// reference: https://docs.rs/reqwest

use crate::config::{APP_NAME, UpdateConfig};
use crate::error::{EflError, Result};
use crate::update::manifest::{UpdateManifest, normalize_manifest_url, parse_manifest};
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    UpToDate { current: String, latest: String },
    Available(UpdateManifest),
}

pub struct UpdateChecker {
    client: reqwest::Client,
    manifest_url: String,
}

impl UpdateChecker {
    pub fn new(manifest_url: &str, timeout: Duration, app_version: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", APP_NAME, app_version))
            .build()?;

        Ok(Self {
            client,
            manifest_url: normalize_manifest_url(manifest_url),
        })
    }

    pub fn from_config(config: &UpdateConfig, app_version: &str) -> Result<Self> {
        Self::new(
            &config.manifest_url,
            Duration::from_secs(config.timeout_secs),
            app_version,
        )
    }

    pub fn manifest_url(&self) -> &str {
        &self.manifest_url
    }

    pub async fn fetch_manifest(&self) -> Result<UpdateManifest> {
        debug!("Fetching update manifest from {}", self.manifest_url);
        let response = self
            .client
            .get(&self.manifest_url)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        parse_manifest(&body)
    }

    pub async fn check(&self, current: &str) -> Result<UpdateStatus> {
        let manifest = self.fetch_manifest().await?;

        if manifest.is_newer_than(current) {
            info!("Update available: {} -> {}", current, manifest.version);
            Ok(UpdateStatus::Available(manifest))
        } else {
            Ok(UpdateStatus::UpToDate {
                current: current.to_string(),
                latest: manifest.version,
            })
        }
    }

    /// Stream the release into `dest_dir`, checking its SHA-256 when the manifest carries one.
    pub async fn download(&self, manifest: &UpdateManifest, dest_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dest_dir).map_err(|e| EflError::file(dest_dir, e))?;

        let url = normalize_manifest_url(&manifest.url);
        let dest = dest_dir.join(download_file_name(&url, &manifest.version));

        let mut response = self
            .client
            .get(&url)
            .header("Accept", "*/*")
            .send()
            .await?
            .error_for_status()?;

        let bar = download_bar(response.content_length());
        let mut staged = StagedDownload::create(&dest)?;

        while let Some(chunk) = response.chunk().await? {
            staged.write(&chunk)?;
            bar.inc(chunk.len() as u64);
        }
        bar.finish_and_clear();

        let dest = staged.commit(manifest.sha256.as_deref())?;
        info!("Downloaded {} to {}", manifest.version, dest.display());
        Ok(dest)
    }
}

/// A download written to a temp file beside its destination.
///
/// Dropping it before `commit` deletes the partial file, so an interrupted
/// or corrupt transfer never appears under the release name.
struct StagedDownload {
    file: NamedTempFile,
    hasher: Sha256,
    dest: PathBuf,
}

impl StagedDownload {
    fn create(dest: &Path) -> Result<Self> {
        let dir = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let file = NamedTempFile::new_in(dir).map_err(|e| EflError::file(dir, e))?;

        Ok(Self {
            file,
            hasher: Sha256::new(),
            dest: dest.to_path_buf(),
        })
    }

    fn write(&mut self, chunk: &[u8]) -> Result<()> {
        self.file
            .write_all(chunk)
            .map_err(|e| EflError::file(self.file.path(), e))?;
        self.hasher.update(chunk);
        Ok(())
    }

    fn commit(mut self, expected_sha256: Option<&str>) -> Result<PathBuf> {
        self.file
            .flush()
            .map_err(|e| EflError::file(self.file.path(), e))?;

        if let Some(expected) = expected_sha256 {
            let actual = format!("{:x}", self.hasher.finalize());
            verify_digest(expected, &actual)?;
        }

        self.file
            .persist(&self.dest)
            .map_err(|e| EflError::file(&self.dest, e.error))?;
        debug!("Moved completed download to {}", self.dest.display());
        Ok(self.dest)
    }
}

fn download_bar(total: Option<u64>) -> ProgressBar {
    match total {
        Some(len) => {
            let bar = ProgressBar::new(len);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            bar
        }
        None => ProgressBar::new_spinner(),
    }
}

fn download_file_name(url: &str, version: &str) -> String {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty() && !name.contains(':'))
        .map(str::to_string)
        .unwrap_or_else(|| format!("efl_cafe-{}.bin", version))
}

fn verify_digest(expected: &str, actual: &str) -> Result<()> {
    if expected.trim().eq_ignore_ascii_case(actual) {
        return Ok(());
    }

    warn!("Checksum mismatch, discarding download");
    Err(EflError::Update(format!(
        "SHA-256 mismatch: expected {}, got {}",
        expected.trim(),
        actual
    )))
}
