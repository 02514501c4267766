// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns

//! OCR course material into unit specs, then generate CEFR-levelled discussion
//! questions with Gemini and write them out as DOCX question sheets.

pub mod ai;
pub mod config;
pub mod document;
pub mod error;
pub mod exporter;
pub mod models;
pub mod ocr;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod source;
pub mod update;
pub mod utils;

pub use ai::{ContentModel, GeminiClient, QuestionGenerator, TopicExtractor};
pub use config::{APP_NAME, APP_VERSION, Config, OcrConfig, OutputConfig, PipelineConfig};
pub use document::{DocxWriter, PdfConverter};
pub use error::{EflError, Result};
pub use exporter::{ExportManifest, ExportedUnit, JsonExporter, load_session, save_session_to};
pub use models::{
    BloomsLevel, CefrLevel, CefrTier, EngagementLevel, GenerationOptions, QuestionSession,
    TopicConsistency, UnitSpec,
};
pub use ocr::{OcrEngine, OcrOutput, SourceKind};
pub use parser::{TopicSpec, parse_topics_spec};
pub use pipeline::{
    ExportedSheet, IngestOutcome, IngestPipeline, PipelineStats, ProgressTracker, Regeneration,
    export_session, regenerate_question,
};
pub use prompts::{PromptTemplates, VersionCheck};
pub use source::{ScannedSource, SourceScanner};
pub use update::{UpdateChecker, UpdateManifest, UpdateStatus};
pub use utils::{
    DebugRecorder, FeedbackLog, HealthCheck, HealthReport, HealthStatus, OperationTimer, Validator,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let config = Config::default_config();
        let _engine = OcrEngine::new(config.ocr.clone());
        let _writer = DocxWriter::from_config(&config.output);
        assert!(!APP_VERSION.is_empty());
    }
}
