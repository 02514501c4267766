// file: src/utils/validation.rs
// description: input validation helpers shared by the cli and library
// reference: input validation patterns

use crate::error::{EflError, Result};
use std::fs;
use std::path::Path;

pub struct Validator;

impl Validator {
    pub fn validate_file_path(path: &Path) -> Result<()> {
        let canonical = fs::canonicalize(path).map_err(|e| {
            EflError::Validation(format!(
                "Cannot canonicalize path {}: {}",
                path.display(),
                e
            ))
        })?;

        if !canonical.is_file() {
            return Err(EflError::Validation(format!(
                "Path is not a file: {}",
                canonical.display()
            )));
        }

        Ok(())
    }

    pub fn validate_docx_extension(path: &Path) -> Result<()> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("docx") => Ok(()),
            _ => Err(EflError::Validation(format!(
                "File is not a .docx document: {}",
                path.display()
            ))),
        }
    }

    pub fn validate_content_not_empty(content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(EflError::Validation("Content is empty".to_string()));
        }
        Ok(())
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(EflError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    /// Check a 1-based question number against the session length and return the 0-based index.
    pub fn validate_question_number(number: usize, total: usize) -> Result<usize> {
        if number == 0 || number > total {
            return Err(EflError::Validation(format!(
                "Question number must be between 1 and {}, got {}",
                total, number
            )));
        }
        Ok(number - 1)
    }

    pub fn validate_file_size(path: &Path, max_mb: usize) -> Result<u64> {
        let size = fs::metadata(path)
            .map_err(|e| EflError::file(path, e))?
            .len();

        if max_mb > 0 && size > (max_mb as u64) * 1024 * 1024 {
            return Err(EflError::Validation(format!(
                "{} is {} bytes, above the {} MB limit",
                path.display(),
                size,
                max_mb
            )));
        }

        Ok(size)
    }
}
