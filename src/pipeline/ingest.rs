// file: src/pipeline/ingest.rs
// description: concurrent ocr and topic extraction over scanned course material
// reference: orchestrates asynchronous ingestion workflow

use crate::ai::TopicExtractor;
use crate::exporter::ExportedUnit;
use crate::ocr::OcrEngine;
use crate::pipeline::progress::{PipelineStats, ProgressTracker};
use crate::source::ScannedSource;
use crate::utils::DebugRecorder;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub enum IngestOutcome {
    Extracted {
        source: ScannedSource,
        unit: Box<ExportedUnit>,
    },
    Failed {
        source: ScannedSource,
        error: String,
    },
}

impl IngestOutcome {
    pub fn source(&self) -> &ScannedSource {
        match self {
            Self::Extracted { source, .. } | Self::Failed { source, .. } => source,
        }
    }
}

pub struct IngestPipeline {
    engine: Arc<OcrEngine>,
    extractor: Arc<TopicExtractor>,
    recorder: DebugRecorder,
    workers: usize,
    colored: bool,
}

impl IngestPipeline {
    pub fn new(engine: OcrEngine, extractor: TopicExtractor, recorder: DebugRecorder) -> Self {
        Self {
            engine: Arc::new(engine),
            extractor: Arc::new(extractor),
            recorder,
            workers: 1,
            colored: true,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// OCR every source and extract its unit, at most `workers` files at a time.
    ///
    /// Outcomes come back in source path order whatever order they finish in.
    pub async fn run(&self, sources: Vec<ScannedSource>) -> (Vec<IngestOutcome>, PipelineStats) {
        if sources.is_empty() {
            warn!("No files found to process");
            return (Vec::new(), PipelineStats::new());
        }

        info!(
            "Processing {} file(s) with {} concurrent task(s)",
            sources.len(),
            self.workers
        );
        let progress = ProgressTracker::with_color(sources.len(), self.colored);

        let progress = &progress;
        let tasks = sources.into_iter().map(|source| async move {
            progress.start_file(&source.relative_path);
            let outcome = self.process(source).await;

            match &outcome {
                IngestOutcome::Extracted { source, unit } => {
                    progress.record_unit(source.size, unit.pages);
                }
                IngestOutcome::Failed { source, error } => {
                    progress.record_failure();
                    warn!("Failed to process {}: {}", source.relative_path, error);
                }
            }
            outcome
        });

        let mut outcomes: Vec<IngestOutcome> = stream::iter(tasks)
            .buffer_unordered(self.workers)
            .collect()
            .await;
        outcomes.sort_by(|a, b| a.source().path.cmp(&b.source().path));

        let stats = progress.stats();
        progress.finish();
        log_final_stats(&stats);

        (outcomes, stats)
    }

    async fn process(&self, source: ScannedSource) -> IngestOutcome {
        let ocr = match self.engine.extract(&source.path).await {
            Ok(ocr) => ocr,
            Err(e) => {
                return IngestOutcome::Failed {
                    source,
                    error: e.to_string(),
                };
            }
        };

        self.recorder
            .record_ocr(&source.path, &source.kind.to_string(), &ocr.text);

        let fallback_title = source
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Document".to_string());
        let unit = self.extractor.extract(&ocr.text, &fallback_title).await;

        IngestOutcome::Extracted {
            source,
            unit: Box::new(ExportedUnit::new(ocr, unit)),
        }
    }
}

fn final_stats_line(stats: &PipelineStats) -> String {
    format!(
        "OCR finished in {:.1}s: {} unit(s), {} failed, {} page(s) ({:.1} pages/min, {:.1} KB/s, {:.0}% success)",
        stats.duration().as_secs_f64(),
        stats.units_extracted,
        stats.files_failed,
        stats.pages_recognized,
        stats.pages_per_minute(),
        stats.bytes_per_second() / 1024.0,
        stats.success_rate()
    )
}

fn log_final_stats(stats: &PipelineStats) {
    info!("{}", final_stats_line(stats));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ocr::SourceKind;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn broken_engine() -> OcrEngine {
        let mut config = Config::default_config().ocr;
        config.tesseract_cmd = "no-such-tesseract-binary".to_string();
        config.grayscale = false;
        OcrEngine::new(config)
    }

    fn source(path: PathBuf) -> ScannedSource {
        ScannedSource {
            relative_path: path.file_name().unwrap().to_string_lossy().to_string(),
            path,
            kind: SourceKind::Image,
            size: 1,
        }
    }

    #[test]
    fn test_final_stats_line_reports_throughput() {
        let stats = PipelineStats {
            files_processed: 3,
            files_failed: 1,
            units_extracted: 3,
            pages_recognized: 6,
            total_bytes_processed: 8192,
            duration_ms: 2000,
        };
        assert_eq!(
            final_stats_line(&stats),
            "OCR finished in 2.0s: 3 unit(s), 1 failed, 6 page(s) (180.0 pages/min, 4.0 KB/s, 75% success)"
        );
    }

    #[tokio::test]
    async fn test_empty_input() {
        let pipeline = IngestPipeline::new(broken_engine(), TopicExtractor::offline(), DebugRecorder::disabled());
        let (outcomes, stats) = pipeline.run(Vec::new()).await;
        assert!(outcomes.is_empty());
        assert_eq!(stats.files_processed, 0);
    }

    #[tokio::test]
    async fn test_failures_are_reported_in_order() {
        let dir = TempDir::new().unwrap();
        let b = dir.path().join("b.png");
        let a = dir.path().join("a.png");
        fs::write(&a, "x").unwrap();
        fs::write(&b, "x").unwrap();

        let pipeline = IngestPipeline::new(broken_engine(), TopicExtractor::offline(), DebugRecorder::disabled())
            .with_workers(2)
            .with_color(false);
        let (outcomes, stats) = pipeline.run(vec![source(b), source(a)]).await;

        assert_eq!(stats.files_failed, 2);
        assert_eq!(stats.files_processed, 0);
        assert_eq!(outcomes[0].source().relative_path, "a.png");
        assert!(matches!(
            &outcomes[1],
            IngestOutcome::Failed { error, .. } if error.contains("no-such-tesseract-binary")
        ));
    }
}
