// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod ingest;
mod progress;
mod session;

pub use ingest::{IngestOutcome, IngestPipeline};
pub use progress::{PipelineStats, ProgressTracker};
pub use session::{ExportedSheet, Regeneration, export_session, regenerate_question};
