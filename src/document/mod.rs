// file: src/document/mod.rs
// description: docx question sheet output
// reference: internal module structure

pub mod package;
pub mod pdf;
pub mod template;
pub mod writer;
pub mod xml;

pub use package::{PageLayout, RunFont};
pub use pdf::PdfConverter;
pub use template::fill_document_xml;
pub use writer::DocxWriter;
