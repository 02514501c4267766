// file: src/utils/mod.rs
// description: utility functions module exports
// reference: internal module structure

pub mod debug;
pub mod feedback;
pub mod health;
pub mod logging;
pub mod validation;

pub use debug::DebugRecorder;
pub use feedback::{FeedbackEntry, FeedbackLog};
pub use health::{HealthCheck, HealthReport, HealthStatus, OperationTimer, diagnose};
pub use validation::Validator;
