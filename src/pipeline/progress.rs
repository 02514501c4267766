// file: src/pipeline/progress.rs
// description: progress bar and running counters for ocr ingestion
// reference: https://docs.rs/indicatif

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub units_extracted: usize,
    pub pages_recognized: usize,
    pub total_bytes_processed: u64,
    pub duration_ms: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn pages_per_minute(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        self.pages_recognized as f64 * 60_000.0 / self.duration_ms as f64
    }

    pub fn bytes_per_second(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        self.total_bytes_processed as f64 * 1000.0 / self.duration_ms as f64
    }

    /// Percentage of attempted files that produced a unit.
    pub fn success_rate(&self) -> f64 {
        let total = self.files_processed + self.files_failed;
        if total == 0 {
            return 0.0;
        }
        (self.files_processed as f64 / total as f64) * 100.0
    }
}

/// Counters are atomics so concurrent OCR tasks can share one tracker by reference.
pub struct ProgressTracker {
    bar: ProgressBar,
    files_processed: AtomicUsize,
    files_failed: AtomicUsize,
    units_extracted: AtomicUsize,
    pages_recognized: AtomicUsize,
    bytes_processed: AtomicU64,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn with_color(total_files: usize, colored: bool) -> Self {
        Self::with_bar(file_bar(total_files as u64, colored))
    }

    pub fn hidden(total_files: usize) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(total_files as u64);
        Self::with_bar(bar)
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_prefix("0 units, 0 failed");
        Self {
            bar,
            files_processed: AtomicUsize::new(0),
            files_failed: AtomicUsize::new(0),
            units_extracted: AtomicUsize::new(0),
            pages_recognized: AtomicUsize::new(0),
            bytes_processed: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn start_file(&self, name: &str) {
        self.bar.set_message(format!("OCR {}", name));
    }

    pub fn record_unit(&self, bytes: u64, pages: usize) {
        self.files_processed.fetch_add(1, Ordering::SeqCst);
        self.units_extracted.fetch_add(1, Ordering::SeqCst);
        self.pages_recognized.fetch_add(pages, Ordering::SeqCst);
        self.bytes_processed.fetch_add(bytes, Ordering::SeqCst);
        self.advance();
    }

    pub fn record_failure(&self) {
        self.files_failed.fetch_add(1, Ordering::SeqCst);
        self.advance();
    }

    pub fn finish(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_with_message("OCR complete");
        }
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            files_processed: self.files_processed.load(Ordering::SeqCst),
            files_failed: self.files_failed.load(Ordering::SeqCst),
            units_extracted: self.units_extracted.load(Ordering::SeqCst),
            pages_recognized: self.pages_recognized.load(Ordering::SeqCst),
            total_bytes_processed: self.bytes_processed.load(Ordering::SeqCst),
            duration_ms: self.start_time.elapsed().as_millis() as u64,
        }
    }

    fn advance(&self) {
        self.bar.set_prefix(format!(
            "{} units, {} failed",
            self.units_extracted.load(Ordering::SeqCst),
            self.files_failed.load(Ordering::SeqCst)
        ));
        self.bar.inc(1);
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn file_bar(total: u64, colored: bool) -> ProgressBar {
    let template = if colored {
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {prefix:.dim} {msg}"
    } else {
        "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {prefix} {msg}"
    };

    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars(if colored { "█▓▒░" } else { "=>-" }),
    );
    bar
}
