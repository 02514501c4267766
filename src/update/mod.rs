// file: src/update/mod.rs
// description: release manifest checks and verified downloads
// reference: internal module structure

mod checker;
mod manifest;

pub use checker::{UpdateChecker, UpdateStatus};
pub use manifest::{UpdateManifest, normalize_manifest_url, parse_manifest, version_tuple};
