// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod level;
pub mod session;
pub mod unit;

pub use level::{
    BloomsLevel, CefrLevel, CefrTier, EngagementLevel, GenerationOptions, LevelBand,
    TopicConsistency,
};
pub use session::{Question, QuestionSession};
pub use unit::UnitSpec;
