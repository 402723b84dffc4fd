//! The unit of validation: one file, its text and its code segments.

use super::code_blocks::{CodeBlockExtractor, CodeSegment};
use crate::discovery::normalize_path;
use crate::error::{AuditError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A discovered document. Built once, never mutated, dropped after its
/// validation pass.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    relative_path: String,
    text: String,
    segments: Vec<CodeSegment>,
}

impl Document {
    /// Read `path` and extract its code segments. `root` is only used to
    /// compute the root-relative path.
    pub fn load(path: &Path, root: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| AuditError::read_error(path, e))?;
        let relative = path.strip_prefix(root).unwrap_or(path);
        Ok(Self::from_text(path, &normalize_path(relative), text))
    }

    pub fn from_text(path: impl Into<PathBuf>, relative_path: &str, text: String) -> Self {
        let segments = CodeBlockExtractor::extract(&text);
        Self {
            path: path.into(),
            relative_path: relative_path.trim_start_matches('/').to_string(),
            text,
            segments,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Root-relative path with `/` separators.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Non-empty code segments in document order.
    pub fn segments(&self) -> &[CodeSegment] {
        &self.segments
    }

    /// Path used in findings and report entries.
    pub fn display_path(&self) -> String {
        self.relative_path.clone()
    }
}
