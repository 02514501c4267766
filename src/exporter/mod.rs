// file: src/exporter/mod.rs
// description: export module exports
// reference: internal module structure

pub mod json;

pub use json::{
    ExportManifest, ExportedUnit, JsonExporter, load_session, load_unit, save_session_to,
};
