// file: src/exporter/json.rs
// description: json persistence for question sessions and ocr-derived units

use crate::error::{EflError, Result};
use crate::models::{QuestionSession, UnitSpec};
use crate::ocr::{OcrOutput, SourceKind};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone)]
pub struct JsonExporter {
    output_dir: PathBuf,
}

/// OCR text for one source file together with the unit extracted from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedUnit {
    pub source: PathBuf,
    pub kind: SourceKind,
    pub pages: usize,
    pub content_hash: String,
    pub unit: UnitSpec,
    pub text: String,
}

impl ExportedUnit {
    pub fn new(ocr: OcrOutput, unit: UnitSpec) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(ocr.text.as_bytes());

        Self {
            source: ocr.path,
            kind: ocr.kind,
            pages: ocr.pages,
            content_hash: format!("{:x}", hasher.finalize()),
            unit,
            text: ocr.text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportManifest {
    pub exported_at: String,
    pub total_units: usize,
    pub files: Vec<String>,
    #[serde(default)]
    pub failed: Vec<String>,
}

impl JsonExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|e| EflError::file(&output_dir, e))?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Default file name for a session: `<title-slug>_<short id>.json`.
    pub fn session_path(&self, session: &QuestionSession) -> PathBuf {
        let id = session.id.simple().to_string();
        self.output_dir.join(format!(
            "{}_{}.json",
            slugify(&session.unit.title),
            &id[..8]
        ))
    }

    pub fn save_session(&self, session: &QuestionSession, pretty: bool) -> Result<PathBuf> {
        let path = self.session_path(session);
        save_session_to(&path, session, pretty)?;
        Ok(path)
    }

    pub fn export_unit(&self, unit: &ExportedUnit, pretty: bool) -> Result<PathBuf> {
        let stem = unit
            .source
            .file_stem()
            .and_then(|s| s.to_str())
            .map(slugify)
            .unwrap_or_else(|| "unit".to_string());
        // Keyed on the source path, so same-named scans from different folders never collide.
        let mut hasher = Sha256::new();
        hasher.update(unit.source.to_string_lossy().as_bytes());
        let source_hash = format!("{:x}", hasher.finalize());
        let path = self
            .output_dir
            .join(format!("{}_{}.unit.json", stem, &source_hash[..8]));

        write_json(&path, unit, pretty)?;
        Ok(path)
    }

    pub fn write_manifest(&self, files: &[PathBuf], failed: &[PathBuf]) -> Result<ExportManifest> {
        let display = |paths: &[PathBuf]| -> Vec<String> {
            paths.iter().map(|p| p.display().to_string()).collect()
        };

        let manifest = ExportManifest {
            exported_at: Utc::now().to_rfc3339(),
            total_units: files.len(),
            files: display(files),
            failed: display(failed),
        };

        write_json(&self.output_dir.join(MANIFEST_FILE), &manifest, true)?;
        info!(
            "Export complete: {} units written to {}",
            manifest.total_units,
            self.output_dir.display()
        );
        Ok(manifest)
    }
}

pub fn save_session_to(path: &Path, session: &QuestionSession, pretty: bool) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| EflError::file(parent, e))?;
    }
    write_json(path, session, pretty)?;
    info!("Saved session {} to {}", session.id, path.display());
    Ok(())
}

pub fn load_session(path: &Path) -> Result<QuestionSession> {
    let content = fs::read_to_string(path).map_err(|e| EflError::file(path, e))?;
    let session: QuestionSession = serde_json::from_str(&content)?;
    Ok(session)
}

pub fn load_unit(path: &Path) -> Result<ExportedUnit> {
    let content = fs::read_to_string(path).map_err(|e| EflError::file(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    fs::write(path, json).map_err(|e| EflError::file(path, e))
}

pub fn slugify(text: &str) -> String {
    let slug = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() { "untitled".to_string() } else { slug }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenerationOptions;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn session() -> QuestionSession {
        QuestionSession::new(
            UnitSpec::new("Eating Out!", vec!["tipping".to_string()], vec![]),
            GenerationOptions::default(),
            vec!["Do you tip?".to_string()],
        )
    }

    #[test]
    fn test_exporter_creation() {
        let dir = tempdir().unwrap();
        let exporter = JsonExporter::new(dir.path().join("nested/out"));
        assert!(exporter.is_ok());
        assert!(dir.path().join("nested/out").is_dir());
    }

    #[test]
    fn test_session_save_and_load() {
        let dir = tempdir().unwrap();
        let exporter = JsonExporter::new(dir.path()).unwrap();
        let original = session();

        let path = exporter.save_session(&original, true).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("eating-out_"));

        let loaded = load_session(&path).unwrap();
        assert_eq!(loaded.id, original.id);
        assert_eq!(loaded.texts(), original.texts());
        assert_eq!(loaded.unit, original.unit);
    }

    #[test]
    fn test_export_unit_and_manifest() {
        let dir = tempdir().unwrap();
        let exporter = JsonExporter::new(dir.path()).unwrap();

        let ocr = OcrOutput {
            path: PathBuf::from("scans/Unit 3 Food.png"),
            kind: SourceKind::Image,
            pages: 1,
            text: "We eat rice".to_string(),
        };
        let unit = ExportedUnit::new(ocr, UnitSpec::new("Food", vec![], vec![]));
        assert_eq!(unit.content_hash.len(), 64);

        let path = exporter.export_unit(&unit, false).unwrap();
        assert!(path.file_name().unwrap().to_str().unwrap().starts_with("unit-3-food_"));
        assert_eq!(load_unit(&path).unwrap().text, "We eat rice");

        let manifest = exporter
            .write_manifest(&[path], &[PathBuf::from("bad.pdf")])
            .unwrap();
        assert_eq!(manifest.total_units, 1);
        assert_eq!(manifest.failed, vec!["bad.pdf".to_string()]);
        assert!(dir.path().join(MANIFEST_FILE).is_file());
    }

    #[test]
    fn test_same_named_sources_do_not_overwrite() {
        let dir = tempdir().unwrap();
        let exporter = JsonExporter::new(dir.path()).unwrap();

        let unit = |source: &str| {
            let ocr = OcrOutput {
                path: PathBuf::from(source),
                kind: SourceKind::Pdf,
                pages: 1,
                text: "=== PAGE 1 ===\nSame scan".to_string(),
            };
            ExportedUnit::new(ocr, UnitSpec::new("Food", vec![], vec![]))
        };

        let first = exporter.export_unit(&unit("term1/unit1.pdf"), false).unwrap();
        let second = exporter.export_unit(&unit("term2/unit1.pdf"), false).unwrap();
        assert_ne!(first, second);
        assert_eq!(load_unit(&first).unwrap().source, PathBuf::from("term1/unit1.pdf"));
        assert_eq!(load_unit(&second).unwrap().source, PathBuf::from("term2/unit1.pdf"));

        let again = exporter.export_unit(&unit("term1/unit1.pdf"), false).unwrap();
        assert_eq!(again, first);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Unit 4B - Looking Back"), "unit-4b-looking-back");
        assert_eq!(slugify("***"), "untitled");
    }
}
