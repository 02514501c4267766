// file: src/ocr/mod.rs
// description: optical character recognition module exports
// reference: internal module structure

pub mod engine;
pub mod source;

pub use engine::{OcrEngine, OcrOutput, join_pages};
pub use source::SourceKind;
