// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EflError>;

#[derive(Error, Debug)]
pub enum EflError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("{tool} failed: {message}")]
    ExternalTool { tool: String, message: String },

    #[error("AI request failed: {0}")]
    Ai(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Document error: {0}")]
    Document(String),

    #[error("Update error: {0}")]
    Update(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl EflError {
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileOperation {
            path: path.into(),
            source,
        }
    }
}
