// file: src/source/scanner.rs
// description: discovery of ocr-able course material from files and directories
// reference: https://docs.rs/walkdir

use crate::config::PipelineConfig;
use crate::error::{EflError, Result};
use crate::ocr::SourceKind;
use crate::utils::validation::Validator;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub struct SourceScanner {
    config: PipelineConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedSource {
    pub path: PathBuf,
    pub relative_path: String,
    pub kind: SourceKind,
    pub size: u64,
}

impl SourceScanner {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Expand files and directories into supported sources, sorted and de-duplicated by path.
    pub fn scan(&self, inputs: &[PathBuf]) -> Result<Vec<ScannedSource>> {
        let mut sources = Vec::new();

        for input in inputs {
            if input.is_dir() {
                sources.extend(self.scan_directory(input));
            } else if input.is_file() {
                match self.accept(input, input.parent().unwrap_or(Path::new(""))) {
                    Some(source) => sources.push(source),
                    None => warn!("Ignoring unsupported or skipped file: {}", input.display()),
                }
            } else {
                return Err(EflError::Validation(format!(
                    "Input does not exist: {}",
                    input.display()
                )));
            }
        }

        // The same file reached through `./`, `..` or a symlink is still one source.
        let mut keyed: Vec<(PathBuf, ScannedSource)> = sources
            .into_iter()
            .map(|source| {
                let key = fs::canonicalize(&source.path).unwrap_or_else(|_| source.path.clone());
                (key, source)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.dedup_by(|a, b| a.0 == b.0);
        let mut sources: Vec<ScannedSource> = keyed.into_iter().map(|(_, source)| source).collect();
        sources.sort_by(|a, b| a.path.cmp(&b.path));

        info!("Found {} OCR source file(s)", sources.len());
        Ok(sources)
    }

    pub fn scan_directory(&self, root: &Path) -> Vec<ScannedSource> {
        debug!("Scanning directory: {}", root.display());

        WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| self.accept(entry.path(), root))
            .collect()
    }

    fn accept(&self, path: &Path, root: &Path) -> Option<ScannedSource> {
        let kind = SourceKind::from_path(path)?;

        if self.should_skip(path) {
            debug!("Skipping file: {}", path.display());
            return None;
        }

        let size = match Validator::validate_file_size(path, self.config.max_file_size_mb) {
            Ok(size) => size,
            Err(e) => {
                debug!("Skipping file: {}", e);
                return None;
            }
        };

        let relative_path = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        Some(ScannedSource {
            path: path.to_path_buf(),
            relative_path,
            kind,
            size,
        })
    }

    /// `*.ext` matches a suffix, `dir/*` a path component, anything else a substring.
    fn should_skip(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy().replace('\\', "/");

        self.config.skip_patterns.iter().any(|pattern| {
            if let Some(suffix) = pattern.strip_prefix('*') {
                path_str.ends_with(suffix)
            } else if let Some(dir) = pattern.strip_suffix("/*") {
                path_str.starts_with(&format!("{}/", dir))
                    || path_str.contains(&format!("/{}/", dir))
            } else {
                path_str.contains(pattern.as_str())
            }
        })
    }
}
