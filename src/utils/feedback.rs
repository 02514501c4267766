// file: src/utils/feedback.rs
// description: ini-style log of instructor feedback on regenerated questions
// reference: internal data structures

use crate::error::{EflError, Result};
use crate::parser::patterns::collapse_whitespace;
use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const SECTION_HEADER: &str = "[feedback]";
const NO_REASON: &str = "n/a";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEntry {
    pub key: String,
    pub question: String,
    pub reason: String,
}

pub struct FeedbackLog {
    path: PathBuf,
}

impl FeedbackLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, question: &str, reason: &str) -> Result<String> {
        self.append_at(question, reason, Local::now())
    }

    /// Append one entry keyed by `now`, suffixing `_n` when the key is taken.
    pub fn append_at(&self, question: &str, reason: &str, now: DateTime<Local>) -> Result<String> {
        let existing = if self.path.exists() {
            fs::read_to_string(&self.path).map_err(|e| EflError::file(&self.path, e))?
        } else {
            String::new()
        };

        let taken: HashSet<String> = parse_entries(&existing).into_iter().map(|e| e.key).collect();
        let base = format!("entry_{}", now.format("%Y%m%d_%H%M%S"));
        let mut key = base.clone();
        let mut suffix = 2;
        while taken.contains(&key) {
            key = format!("{}_{}", base, suffix);
            suffix += 1;
        }

        let question = collapse_whitespace(question);
        let reason = match collapse_whitespace(reason) {
            r if r.is_empty() => NO_REASON.to_string(),
            r => r,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| EflError::file(&self.path, e))?;

        let mut block = String::new();
        if !existing.lines().any(|l| l.trim() == SECTION_HEADER) {
            if !existing.is_empty() && !existing.ends_with('\n') {
                block.push('\n');
            }
            block.push_str(SECTION_HEADER);
            block.push('\n');
        } else if !existing.is_empty() && !existing.ends_with('\n') {
            block.push('\n');
        }
        block.push_str(&format!("{} = question={}|reason={}\n", key, question, reason));

        file.write_all(block.as_bytes())
            .map_err(|e| EflError::file(&self.path, e))?;

        debug!("Recorded feedback {} in {}", key, self.path.display());
        Ok(key)
    }

    pub fn entries(&self) -> Result<Vec<FeedbackEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| EflError::file(&self.path, e))?;
        Ok(parse_entries(&content))
    }
}

fn parse_entries(content: &str) -> Vec<FeedbackEntry> {
    let mut in_section = false;
    let mut entries = Vec::new();

    for line in content.lines().map(str::trim) {
        if line.starts_with('[') {
            in_section = line == SECTION_HEADER;
            continue;
        }
        if !in_section {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        let (question, reason) = match value.rsplit_once("|reason=") {
            Some((q, r)) => (q.trim_start_matches("question=").to_string(), r.to_string()),
            None => (value.trim_start_matches("question=").to_string(), NO_REASON.to_string()),
        };

        entries.push(FeedbackEntry {
            key: key.trim().to_string(),
            question,
            reason,
        });
    }

    entries
}
