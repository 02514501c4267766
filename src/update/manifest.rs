// file: src/update/manifest.rs
// description: release manifest format and version comparison

use crate::error::{EflError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateManifest {
    pub version: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl UpdateManifest {
    pub fn is_newer_than(&self, current: &str) -> bool {
        compare_versions(&self.version, current) == Ordering::Greater
    }
}

/// Rewrite a `github.com/<owner>/<repo>/blob/<ref>/<path>` page link into its raw file URL.
pub fn normalize_manifest_url(url: &str) -> String {
    if url.contains("github.com") && url.contains("/blob/") {
        url.replace("https://github.com/", "https://raw.githubusercontent.com/")
            .replace("/blob/", "/")
    } else {
        url.to_string()
    }
}

/// Every run of digits in `version`, in order. A version without digits is `[0]`.
pub fn version_tuple(version: &str) -> Vec<u64> {
    let numbers: Vec<u64> = version
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse().ok())
        .collect();

    if numbers.is_empty() { vec![0] } else { numbers }
}

pub fn compare_versions(a: &str, b: &str) -> Ordering {
    version_tuple(a).cmp(&version_tuple(b))
}

pub fn parse_manifest(body: &[u8]) -> Result<UpdateManifest> {
    let head = String::from_utf8_lossy(&body[..body.len().min(200)]).to_lowercase();
    if head.contains("<html") || head.contains("<!doctype") {
        return Err(EflError::Update(
            "Invalid manifest (HTML received)".to_string(),
        ));
    }

    let manifest: UpdateManifest = serde_json::from_slice(body)
        .map_err(|e| EflError::Update(format!("Invalid manifest: {}", e)))?;

    if manifest.url.trim().is_empty() {
        return Err(EflError::Update("Manifest has no download url".to_string()));
    }
    Ok(manifest)
}
