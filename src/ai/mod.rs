// file: src/ai/mod.rs
// description: generative model access, topic extraction and question generation
// reference: internal module structure

pub mod gemini;
pub mod model;
pub mod questions;
pub mod topics;

pub use gemini::GeminiClient;
pub use model::ContentModel;
pub use questions::QuestionGenerator;
pub use topics::TopicExtractor;
