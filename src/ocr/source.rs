// file: src/ocr/source.rs
// description: classification of input files into OCR source kinds
// reference: file extension conventions for scanned course material

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp", "gif", "webp"];
pub const PDF_EXTENSIONS: &[&str] = &["pdf"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Image,
    Pdf,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();

        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Image)
        } else if PDF_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Pdf)
        } else {
            None
        }
    }

    pub fn is_supported(path: &Path) -> bool {
        Self::from_path(path).is_some()
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Pdf => write!(f, "pdf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_source_kind_from_extension() {
        assert_eq!(SourceKind::from_path(&PathBuf::from("scan.PNG")), Some(SourceKind::Image));
        assert_eq!(SourceKind::from_path(&PathBuf::from("a/b/page.jpeg")), Some(SourceKind::Image));
        assert_eq!(SourceKind::from_path(&PathBuf::from("unit3.pdf")), Some(SourceKind::Pdf));
        assert_eq!(SourceKind::from_path(&PathBuf::from("notes.txt")), None);
        assert_eq!(SourceKind::from_path(&PathBuf::from("README")), None);
    }
}
