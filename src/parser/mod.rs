// file: src/parser/mod.rs
// description: text parsing module exports
// reference: internal module structure

pub mod patterns;
pub mod questions;
pub mod topics;

pub use questions::{
    DEFAULT_QUESTION_COUNT, FILLER_QUESTION, ensure_count, parse_numbered_questions,
    single_question_from_response,
};
pub use topics::{TopicSpec, parse_topic_extraction, parse_topics_spec, simple_topic_fallback};
