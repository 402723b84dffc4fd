//! Error types for cmd-audit.
//!
//! Only run-fatal conditions are modelled as `AuditError`. Per-file failures
//! travel inside `FileReport` values and advisory problems become registry
//! warnings, so neither ever aborts a build.

mod context;

pub use context::IoOperation;

use crate::config::ConfigError;
use crate::registry::IntegrityViolation;
use crate::security::PathSecurityError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    /// The scan root itself is missing or inaccessible.
    #[error("Root directory not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to {operation} {path}: {source}")]
    Io {
        path: PathBuf,
        operation: IoOperation,
        #[source]
        source: std::io::Error,
    },

    #[error("Registry integrity check failed with {} violation(s): {}", .0.len(), summarize(.0))]
    Integrity(Vec<IntegrityViolation>),

    #[error("Duplicate command id: {0}")]
    DuplicateCommandId(String),

    #[error("Unsafe path: {0}")]
    PathSecurity(#[from] PathSecurityError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuditError {
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            operation: IoOperation::Read,
            source,
        }
    }

    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            operation: IoOperation::Write,
            source,
        }
    }

    /// True for the "root missing" family that callers may want to report
    /// differently from other fatal errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RootNotFound(_))
    }
}

fn summarize(violations: &[IntegrityViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, AuditError>;
