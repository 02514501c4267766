// file: src/utils/health.rs
// description: environment health checks behind the doctor command and operation timing
// reference: production observability practices

use crate::config::{APP_VERSION, Config};
use crate::document::PdfConverter;
use crate::ocr::OcrEngine;
use crate::prompts::{VersionCheck, check_version};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub component: String,
    pub status: HealthStatus,
    pub message: Option<String>,
    pub response_time_ms: u64,
}

impl HealthCheck {
    pub fn healthy(component: &str, response_time: Duration) -> Self {
        Self::with_status(component, HealthStatus::Healthy, None, response_time)
    }

    pub fn degraded(component: &str, message: String, response_time: Duration) -> Self {
        Self::with_status(component, HealthStatus::Degraded, Some(message), response_time)
    }

    pub fn unhealthy(component: &str, message: String, response_time: Duration) -> Self {
        Self::with_status(component, HealthStatus::Unhealthy, Some(message), response_time)
    }

    fn with_status(
        component: &str,
        status: HealthStatus,
        message: Option<String>,
        response_time: Duration,
    ) -> Self {
        Self {
            component: component.to_string(),
            status,
            message,
            response_time_ms: response_time.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall_status: HealthStatus,
    pub checks: Vec<HealthCheck>,
    pub timestamp: u64,
    pub version: String,
}

impl HealthReport {
    /// Overall status is the worst component status.
    pub fn new(checks: Vec<HealthCheck>, version: String) -> Self {
        let overall_status = if checks.iter().any(|c| c.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else if checks.iter().any(|c| c.status == HealthStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_secs();

        Self {
            overall_status,
            checks,
            timestamp,
            version,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.overall_status != HealthStatus::Unhealthy
    }

    pub fn format(&self) -> String {
        let mut output = format!(
            "{} System Health: {:?}\n\
             Version: {}\n\
             Timestamp: {}\n\n",
            status_icon(&self.overall_status),
            self.overall_status,
            self.version,
            chrono::DateTime::from_timestamp(self.timestamp as i64, 0)
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );

        for check in &self.checks {
            output.push_str(&format!(
                "{} {} ({:?}) - {}ms",
                status_icon(&check.status),
                check.component,
                check.status,
                check.response_time_ms
            ));

            if let Some(ref msg) = check.message {
                output.push_str(&format!("\n  {}", msg));
            }

            output.push('\n');
        }

        output
    }
}

fn status_icon(status: &HealthStatus) -> &'static str {
    match status {
        HealthStatus::Healthy => "✓",
        HealthStatus::Degraded => "⚠",
        HealthStatus::Unhealthy => "✗",
    }
}

/// Probe every external dependency the pipeline needs.
pub async fn diagnose(config: &Config) -> HealthReport {
    let engine = OcrEngine::new(config.ocr.clone());
    let converter = PdfConverter::from_config(&config.output);

    let checks = vec![
        check_tesseract(&engine).await,
        check_pdftoppm(&engine).await,
        check_api_key(config),
        check_prompts(&config.prompts.path),
        check_template(config.output.template_path.as_deref()),
        check_soffice(&converter).await,
    ];

    HealthReport::new(checks, APP_VERSION.to_string())
}

async fn check_tesseract(engine: &OcrEngine) -> HealthCheck {
    let start = Instant::now();
    if engine.is_available().await {
        HealthCheck::healthy("tesseract", start.elapsed())
    } else {
        HealthCheck::unhealthy(
            "tesseract",
            format!(
                "'{}' could not be run; install Tesseract OCR or set ocr.tesseract_cmd",
                engine.config().tesseract_cmd
            ),
            start.elapsed(),
        )
    }
}

async fn check_pdftoppm(engine: &OcrEngine) -> HealthCheck {
    let start = Instant::now();
    if engine.pdf_support_available().await {
        HealthCheck::healthy("pdftoppm", start.elapsed())
    } else {
        HealthCheck::degraded(
            "pdftoppm",
            format!(
                "'{}' could not be run; PDF input is unavailable",
                engine.config().pdftoppm_cmd
            ),
            start.elapsed(),
        )
    }
}

fn check_api_key(config: &Config) -> HealthCheck {
    let start = Instant::now();
    match config.gemini.resolved_api_key() {
        Some(_) => HealthCheck::healthy("gemini api key", start.elapsed()),
        None => HealthCheck::unhealthy(
            "gemini api key",
            "No key configured; set GEMINI_API_KEY or gemini.api_key".to_string(),
            start.elapsed(),
        ),
    }
}

fn check_prompts(path: &Path) -> HealthCheck {
    let start = Instant::now();
    let component = "prompts file";

    match check_version(path, APP_VERSION) {
        Ok(VersionCheck::Match(_)) => HealthCheck::healthy(component, start.elapsed()),
        Ok(VersionCheck::NoFile) => HealthCheck::degraded(
            component,
            format!("{} not found, built-in templates in use", path.display()),
            start.elapsed(),
        ),
        Ok(VersionCheck::Missing) => HealthCheck::degraded(
            component,
            format!("{} has no '# Version:' header", path.display()),
            start.elapsed(),
        ),
        Ok(VersionCheck::Mismatch { file, app }) => HealthCheck::degraded(
            component,
            format!(
                "{} is version {} but the application is {}; run `prompts sync-version`",
                path.display(),
                file,
                app
            ),
            start.elapsed(),
        ),
        Err(e) => HealthCheck::unhealthy(component, e.to_string(), start.elapsed()),
    }
}

fn check_template(path: Option<&Path>) -> HealthCheck {
    let start = Instant::now();
    match path {
        None => HealthCheck::healthy("docx template", start.elapsed()),
        Some(path) if path.is_file() => HealthCheck::healthy("docx template", start.elapsed()),
        Some(path) => HealthCheck::unhealthy(
            "docx template",
            format!("Configured template {} does not exist", path.display()),
            start.elapsed(),
        ),
    }
}

async fn check_soffice(converter: &PdfConverter) -> HealthCheck {
    let start = Instant::now();
    if converter.is_available().await {
        HealthCheck::healthy("soffice", start.elapsed())
    } else {
        HealthCheck::degraded(
            "soffice",
            format!(
                "'{}' could not be run; PDF export is unavailable (install LibreOffice or set output.soffice_cmd)",
                converter.command()
            ),
            start.elapsed(),
        )
    }
}

pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        info!("Starting operation: {}", operation);
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish(self) -> Duration {
        let elapsed = self.elapsed();
        info!(
            "Completed operation: {} in {:.2}s",
            self.operation,
            elapsed.as_secs_f64()
        );
        elapsed
    }
}
