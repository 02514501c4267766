// file: src/document/pdf.rs
// description: docx to pdf conversion through headless libreoffice
// reference: https://help.libreoffice.org/latest/en-US/text/shared/guide/start_parameters.html

use crate::config::OutputConfig;
use crate::error::{EflError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

pub struct PdfConverter {
    soffice_cmd: String,
    timeout: Duration,
}

impl PdfConverter {
    pub fn new(soffice_cmd: impl Into<String>, timeout: Duration) -> Self {
        Self {
            soffice_cmd: soffice_cmd.into(),
            timeout,
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(
            config.soffice_cmd.clone(),
            Duration::from_secs(config.pdf_timeout_secs.max(1)),
        )
    }

    pub fn command(&self) -> &str {
        &self.soffice_cmd
    }

    pub async fn is_available(&self) -> bool {
        match Command::new(&self.soffice_cmd).arg("--version").output().await {
            Ok(output) => output.status.success(),
            Err(e) => {
                debug!("{} is not available: {}", self.soffice_cmd, e);
                false
            }
        }
    }

    /// Convert `docx` into `pdf`.
    ///
    /// soffice always names its output after the input stem inside `--outdir`,
    /// so the result is moved when `pdf` asks for another name.
    pub async fn convert(&self, docx: &Path, pdf: &Path) -> Result<PathBuf> {
        if !docx.is_file() {
            return Err(EflError::Validation(format!(
                "DOCX not found: {}",
                docx.display()
            )));
        }

        let out_dir = pdf
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(out_dir).map_err(|e| EflError::file(out_dir, e))?;

        let mut command = Command::new(&self.soffice_cmd);
        command
            .args(["--headless", "--convert-to", "pdf", "--outdir"])
            .arg(out_dir)
            .arg(docx)
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                self.tool_error(format!(
                    "conversion timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| self.tool_error(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(self.tool_error(stderr));
        }

        let mut produced_name = docx
            .file_stem()
            .ok_or_else(|| EflError::Validation(format!("Bad DOCX name: {}", docx.display())))?
            .to_os_string();
        produced_name.push(".pdf");
        let produced = out_dir.join(produced_name);

        if produced != pdf && produced.is_file() {
            fs::rename(&produced, pdf).map_err(|e| EflError::file(pdf, e))?;
        }
        if !pdf.is_file() {
            return Err(self.tool_error(format!("no PDF was written to {}", pdf.display())));
        }

        info!("Converted {} to {}", docx.display(), pdf.display());
        Ok(pdf.to_path_buf())
    }

    fn tool_error(&self, message: String) -> EflError {
        EflError::ExternalTool {
            tool: self.soffice_cmd.clone(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn fake_soffice(dir: &Path, script: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("soffice");
        fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn converter(cmd: &str) -> PdfConverter {
        PdfConverter::new(cmd, Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_missing_soffice() {
        let dir = TempDir::new().unwrap();
        let docx = dir.path().join("unit.docx");
        fs::write(&docx, "x").unwrap();

        let missing = converter("no-such-soffice-binary");
        assert!(!missing.is_available().await);

        let err = missing.convert(&docx, &dir.path().join("unit.pdf")).await.unwrap_err();
        assert!(matches!(err, EflError::ExternalTool { ref tool, .. } if tool == "no-such-soffice-binary"));
    }

    #[tokio::test]
    async fn test_missing_docx_is_rejected() {
        let dir = TempDir::new().unwrap();
        let result = converter("soffice")
            .convert(&dir.path().join("gone.docx"), &dir.path().join("gone.pdf"))
            .await;
        assert!(matches!(result, Err(EflError::Validation(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_renamed_to_requested_pdf() {
        let dir = TempDir::new().unwrap();
        let docx = dir.path().join("unit.docx");
        fs::write(&docx, "x").unwrap();

        // $5 is the --outdir value; write <outdir>/<stem>.pdf like soffice does.
        let cmd = fake_soffice(dir.path(), r#"stem=$(basename "$6" .docx); echo "%PDF" > "$5/$stem.pdf""#);
        let target = dir.path().join("out/Food sheet.pdf");

        let written = converter(&cmd).convert(&docx, &target).await.unwrap();
        assert_eq!(written, target);
        assert!(target.is_file());
        assert!(!dir.path().join("out/unit.pdf").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_conversion_reports_stderr() {
        let dir = TempDir::new().unwrap();
        let docx = dir.path().join("unit.docx");
        fs::write(&docx, "x").unwrap();

        let cmd = fake_soffice(dir.path(), "echo 'source file could not be loaded' >&2; exit 1");
        let err = converter(&cmd)
            .convert(&docx, &dir.path().join("unit.pdf"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("source file could not be loaded"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_silent_soffice_without_output_is_error() {
        let dir = TempDir::new().unwrap();
        let docx = dir.path().join("unit.docx");
        fs::write(&docx, "x").unwrap();

        let cmd = fake_soffice(dir.path(), "exit 0");
        let err = converter(&cmd)
            .convert(&docx, &dir.path().join("unit.pdf"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no PDF was written"));
    }
}
