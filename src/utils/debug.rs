// file: src/utils/debug.rs
// description: optional on-disk recording of ocr output and model exchanges
// reference: internal debugging aids

use crate::config::DebugConfig;
use crate::prompts::CORE_PLACEHOLDERS;
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Marker file that switches debug recording on when placed next to the executable.
pub const DEBUG_MARKER: &str = "DEBUG.txt";

const RULE: usize = 80;
const HALF_RULE: usize = 40;

#[derive(Debug, Clone, Default)]
pub struct DebugRecorder {
    directory: Option<PathBuf>,
    run_stamp: String,
}

impl DebugRecorder {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(directory.into()),
            run_stamp: Local::now().format("%Y%m%d_%H%M%S").to_string(),
        }
    }

    pub fn from_config(config: &DebugConfig) -> Self {
        let marker = marker_next_to_executable();
        if config.enabled || marker.is_some() {
            if let Some(marker) = marker {
                info!("Debug recording enabled by {}", marker.display());
            }
            Self::new(&config.directory)
        } else {
            Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.directory.is_some()
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Write one OCR result to its own timestamped file.
    pub fn record_ocr(&self, file: &Path, kind: &str, text: &str) -> Option<PathBuf> {
        let dir = self.ensure_dir()?;
        let now = Local::now();
        // Concurrent OCR tasks can finish within the same millisecond.
        let path = dir.join(format!(
            "ocr_output_{}_{}.txt",
            now.format("%Y%m%d_%H%M%S_%3f"),
            &Uuid::new_v4().simple().to_string()[..8]
        ));

        let rule = "=".repeat(RULE);
        let entry = format!(
            "{rule}\nTIMESTAMP: {}\nOCR FILE: {}\nFILE TYPE: {}\n{rule}\n\nEXTRACTED TEXT:\n{}\n\n{rule}\nEND OF OCR OUTPUT\n{rule}\n",
            now.format("%Y-%m-%d %H:%M:%S"),
            file.display(),
            kind.to_uppercase(),
            text,
        );

        match fs::write(&path, entry) {
            Ok(()) => {
                debug!("OCR output recorded to {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Failed to record OCR output: {}", e);
                None
            }
        }
    }

    /// Append one prompt/response exchange to this run's conversation log.
    pub fn record_conversation(
        &self,
        kind: &str,
        prompt: &str,
        response: Option<&str>,
        error: Option<&str>,
    ) -> Option<PathBuf> {
        let dir = self.ensure_dir()?;
        let path = dir.join(format!("ai_conversations_{}.txt", self.run_stamp));
        let unformatted = has_unformatted_placeholders(prompt);

        let rule = "=".repeat(RULE);
        let half = "=".repeat(HALF_RULE);
        let status = if unformatted {
            "WARNING - Contains unformatted placeholders!"
        } else {
            "OK - Properly formatted"
        };
        let entry = format!(
            "{rule}\nTIMESTAMP: {}\nCONVERSATION TYPE: {}\nFORMATTING STATUS: {}\n{rule}\n\nPROMPT:\n{}\n\n{half}\nRESPONSE:\n{}\n\n{half}\nERROR:\n{}\n\n{rule}\n\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            kind,
            status,
            prompt,
            response.unwrap_or("No response"),
            error.unwrap_or("No error"),
        );

        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut f| f.write_all(entry.as_bytes()));

        if let Err(e) = written {
            warn!("Failed to record AI conversation: {}", e);
            return None;
        }

        if unformatted {
            warn!(
                "Recorded prompt contains unformatted placeholders, see {}",
                path.display()
            );
        }
        Some(path)
    }

    fn ensure_dir(&self) -> Option<&Path> {
        let dir = self.directory.as_deref()?;
        if let Err(e) = fs::create_dir_all(dir) {
            warn!("Cannot create debug directory {}: {}", dir.display(), e);
            return None;
        }
        Some(dir)
    }
}

pub fn has_unformatted_placeholders(prompt: &str) -> bool {
    CORE_PLACEHOLDERS.iter().any(|p| prompt.contains(p))
}

fn marker_next_to_executable() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let marker = exe.parent()?.join(DEBUG_MARKER);
    marker.is_file().then_some(marker)
}
