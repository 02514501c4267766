// file: src/prompts/mod.rs
// description: prompt construction module exports
// reference: internal module structure

pub mod instructions;
pub mod templates;

pub use instructions::with_feedback;
pub use templates::{
    CORE_PLACEHOLDERS, PromptTemplates, PromptVars, RenderedPrompt, VersionCheck, check_version,
    prompts_file_version, render, sync_version,
};
