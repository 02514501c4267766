// file: src/ocr/engine.rs
// description: tesseract and pdftoppm driven text recognition for images and pdfs
// reference: https://tesseract-ocr.github.io/tessdoc/Command-Line-Usage.html

use crate::config::OcrConfig;
use crate::error::{EflError, Result};
use crate::ocr::source::SourceKind;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Recognized text for one input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrOutput {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub pages: usize,
    pub text: String,
}

pub struct OcrEngine {
    config: OcrConfig,
}

impl OcrEngine {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    pub async fn is_available(&self) -> bool {
        tool_responds(&self.config.tesseract_cmd, "--version").await
    }

    pub async fn pdf_support_available(&self) -> bool {
        tool_responds(&self.config.pdftoppm_cmd, "-v").await
    }

    /// Recognize text in an image or pdf, chosen by file extension.
    pub async fn extract(&self, path: &Path) -> Result<OcrOutput> {
        let kind = SourceKind::from_path(path).ok_or_else(|| {
            EflError::Validation(format!("Unsupported file type: {}", path.display()))
        })?;

        if !path.is_file() {
            return Err(EflError::Validation(format!(
                "File not found: {}",
                path.display()
            )));
        }

        let (text, pages) = match kind {
            SourceKind::Image => (self.ocr_image(path).await?, 1),
            SourceKind::Pdf => {
                let pages = self.ocr_pdf(path).await?;
                let count = pages.len();
                // Page markers alone must not pass for recognized text.
                if pages.iter().all(|page| page.trim().is_empty()) {
                    (String::new(), count)
                } else {
                    (join_pages(&pages), count)
                }
            }
        };

        if text.trim().is_empty() {
            return Err(EflError::Ocr(format!(
                "No text could be extracted from {}",
                path.display()
            )));
        }

        info!(
            "OCR extracted {} chars from {} ({}, {} page(s))",
            text.len(),
            path.display(),
            kind,
            pages
        );

        Ok(OcrOutput {
            path: path.to_path_buf(),
            kind,
            pages,
            text,
        })
    }

    pub async fn ocr_image(&self, path: &Path) -> Result<String> {
        if !self.config.grayscale {
            return self.run_tesseract(path).await;
        }

        let prepared = std::env::temp_dir().join(format!("efl_ocr_{}.png", Uuid::new_v4()));
        let source = path.to_path_buf();
        let target = prepared.clone();

        tokio::task::spawn_blocking(move || preprocess_image(&source, &target))
            .await
            .map_err(|e| EflError::Ocr(format!("Image preprocessing task failed: {}", e)))??;

        let result = self.run_tesseract(&prepared).await;

        if let Err(e) = fs::remove_file(&prepared) {
            debug!("Could not remove temp image {}: {}", prepared.display(), e);
        }

        result
    }

    /// Rasterize up to `max_pdf_pages` pages and OCR each in order.
    pub async fn ocr_pdf(&self, path: &Path) -> Result<Vec<String>> {
        let work_dir = std::env::temp_dir().join(format!("efl_pdf_{}", Uuid::new_v4()));
        fs::create_dir_all(&work_dir).map_err(|e| EflError::file(&work_dir, e))?;

        let result = self.ocr_pdf_in(path, &work_dir).await;

        if let Err(e) = fs::remove_dir_all(&work_dir) {
            debug!("Could not remove temp dir {}: {}", work_dir.display(), e);
        }

        result
    }

    async fn ocr_pdf_in(&self, path: &Path, work_dir: &Path) -> Result<Vec<String>> {
        let prefix = work_dir.join("page");

        let output = Command::new(&self.config.pdftoppm_cmd)
            .args(self.pdftoppm_args(path, &prefix))
            .output()
            .await
            .map_err(|e| EflError::ExternalTool {
                tool: self.config.pdftoppm_cmd.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(EflError::ExternalTool {
                tool: self.config.pdftoppm_cmd.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let mut images: Vec<(u32, PathBuf)> = fs::read_dir(work_dir)
            .map_err(|e| EflError::file(work_dir, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter_map(|p| page_number(&p).map(|n| (n, p)))
            .collect();
        images.sort_by_key(|(n, _)| *n);

        if images.is_empty() {
            return Err(EflError::Ocr(format!(
                "No pages rendered from {}",
                path.display()
            )));
        }

        debug!("Rendered {} page(s) from {}", images.len(), path.display());

        let mut pages = Vec::with_capacity(images.len());
        for (number, image) in images {
            match self.run_tesseract(&image).await {
                Ok(text) => pages.push(text),
                Err(e) => {
                    warn!("OCR failed on page {} of {}: {}", number, path.display(), e);
                    pages.push(String::new());
                }
            }
        }

        Ok(pages)
    }

    async fn run_tesseract(&self, image: &Path) -> Result<String> {
        let mut command = Command::new(&self.config.tesseract_cmd);
        command.args(self.tesseract_args(image));

        if let Some(tessdata) = &self.config.tessdata_dir {
            command.env("TESSDATA_PREFIX", tessdata);
        }

        let output = command.output().await.map_err(|e| EflError::ExternalTool {
            tool: self.config.tesseract_cmd.clone(),
            message: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(EflError::ExternalTool {
                tool: self.config.tesseract_cmd.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn tesseract_args(&self, image: &Path) -> Vec<OsString> {
        vec![
            image.as_os_str().to_owned(),
            "stdout".into(),
            "-l".into(),
            self.config.language.clone().into(),
            "--psm".into(),
            self.config.psm.to_string().into(),
        ]
    }

    fn pdftoppm_args(&self, pdf: &Path, prefix: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-r".into(), self.config.pdf_dpi.to_string().into()];

        if self.config.max_pdf_pages > 0 {
            args.extend([
                "-f".into(),
                "1".into(),
                "-l".into(),
                self.config.max_pdf_pages.to_string().into(),
            ]);
        }
        if self.config.grayscale {
            args.push("-gray".into());
        }

        args.push("-png".into());
        args.push(pdf.as_os_str().to_owned());
        args.push(prefix.as_os_str().to_owned());
        args
    }
}

/// A tool counts as present when it can be spawned at all.
async fn tool_responds(cmd: &str, flag: &str) -> bool {
    match Command::new(cmd).arg(flag).output().await {
        Ok(_) => true,
        Err(e) => {
            debug!("{} is not available: {}", cmd, e);
            false
        }
    }
}

fn preprocess_image(source: &Path, target: &Path) -> Result<()> {
    let img = image::open(source)?;
    img.grayscale().save(target)?;
    Ok(())
}

/// Page number from pdftoppm output names such as `page-03.png`.
fn page_number(path: &Path) -> Option<u32> {
    if path.extension()?.to_str()? != "png" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let (_, number) = stem.rsplit_once('-')?;
    number.parse().ok()
}

pub fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .enumerate()
        .map(|(i, text)| format!("=== PAGE {} ===\n{}", i + 1, text.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn engine() -> OcrEngine {
        OcrEngine::new(crate::config::Config::default_config().ocr)
    }

    #[test]
    fn test_join_pages() {
        let joined = join_pages(&["first page\n".to_string(), "  second".to_string()]);
        assert_eq!(joined, "=== PAGE 1 ===\nfirst page\n\n=== PAGE 2 ===\nsecond");
    }

    #[test]
    fn test_page_number_ordering() {
        assert_eq!(page_number(Path::new("/tmp/x/page-1.png")), Some(1));
        assert_eq!(page_number(Path::new("/tmp/x/page-12.png")), Some(12));
        assert_eq!(page_number(Path::new("/tmp/x/page-03.png")), Some(3));
        assert_eq!(page_number(Path::new("/tmp/x/page.png")), None);
        assert_eq!(page_number(Path::new("/tmp/x/page-1.ppm")), None);
    }

    #[test]
    fn test_tesseract_args() {
        let args = engine().tesseract_args(Path::new("scan.png"));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["scan.png", "stdout", "-l", "eng", "--psm", "3"]);
    }

    #[test]
    fn test_pdftoppm_args_limit_pages() {
        let args = engine().pdftoppm_args(Path::new("unit.pdf"), Path::new("/tmp/p/page"));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec!["-r", "150", "-f", "1", "-l", "5", "-gray", "-png", "unit.pdf", "/tmp/p/page"]
        );
    }

    #[test]
    fn test_preprocess_writes_grayscale_png() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("color.png");
        let target = dir.path().join("gray.png");

        image::RgbImage::from_pixel(4, 4, image::Rgb([200, 10, 10]))
            .save(&source)
            .unwrap();
        preprocess_image(&source, &target).unwrap();

        let gray = image::open(&target).unwrap();
        assert_eq!(gray.color(), image::ColorType::L8);
    }

    #[tokio::test]
    async fn test_missing_tool_is_unavailable() {
        let mut config = crate::config::Config::default_config().ocr;
        config.tesseract_cmd = "definitely-not-a-real-tesseract-binary".to_string();
        assert!(!OcrEngine::new(config).is_available().await);
    }

    #[cfg(unix)]
    fn fake_tool(dir: &Path, name: &str, script: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pdf_with_only_failed_pages_has_no_text() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("unit.pdf");
        fs::write(&pdf, "%PDF-1.4").unwrap();

        let mut config = crate::config::Config::default_config().ocr;
        config.grayscale = false;
        // Last argument is the output prefix; render two blank pages.
        config.pdftoppm_cmd = fake_tool(
            dir.path(),
            "pdftoppm",
            r#"for last; do :; done; : > "$last-1.png"; : > "$last-2.png""#,
        );
        config.tesseract_cmd = fake_tool(dir.path(), "tesseract", "exit 1");

        let result = OcrEngine::new(config).extract(&pdf).await;
        assert!(matches!(
            result,
            Err(EflError::Ocr(message)) if message.contains("No text could be extracted")
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pdf_keeps_pages_when_one_is_recognized() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("unit.pdf");
        fs::write(&pdf, "%PDF-1.4").unwrap();

        let mut config = crate::config::Config::default_config().ocr;
        config.grayscale = false;
        config.pdftoppm_cmd = fake_tool(
            dir.path(),
            "pdftoppm",
            r#"for last; do :; done; : > "$last-1.png"; : > "$last-2.png""#,
        );
        config.tesseract_cmd = fake_tool(
            dir.path(),
            "tesseract",
            r#"case "$1" in *-1.png) echo "Unit 3 Food";; *) exit 1;; esac"#,
        );

        let output = OcrEngine::new(config).extract(&pdf).await.unwrap();
        assert_eq!(output.pages, 2);
        assert_eq!(output.text, "=== PAGE 1 ===\nUnit 3 Food\n\n=== PAGE 2 ===\n");
    }

    #[tokio::test]
    async fn test_extract_rejects_unsupported_and_missing() {
        let dir = TempDir::new().unwrap();
        let txt = dir.path().join("notes.txt");
        fs::write(&txt, "hello").unwrap();

        assert!(matches!(
            engine().extract(&txt).await,
            Err(EflError::Validation(_))
        ));
        assert!(matches!(
            engine().extract(&dir.path().join("missing.png")).await,
            Err(EflError::Validation(_))
        ));
    }
}
