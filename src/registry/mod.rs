//! Registry assembly layer.
//!
//! - `phases`: path-prefix category/phase table
//! - `metadata`: name, description, usage, parameters and examples
//! - `builder`: per-file pipeline and single-writer merge
//! - `integrity`: mandatory post-build referential check
//! - `store`: atomic JSON persistence

pub mod builder;
pub mod integrity;
pub mod metadata;
pub mod phases;
pub mod store;
pub mod types;

pub use builder::{FileReport, RegistryBuilder};
pub use integrity::{IntegrityViolation, check, verify_integrity};
pub use metadata::{ExtractedMetadata, MetadataExtractor, command_id};
pub use phases::{CategoryTable, FALLBACK_CATEGORY, FALLBACK_PHASE};
pub use types::*;
