//! Stack-based tag balance checking.

use super::tokenizer::{TagKind, TagToken, tokenize};
use crate::parser::Document;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::trace;

/// Section markers every command document must contain as complete pairs.
pub const REQUIRED_SECTIONS: &[&str] = &["role", "activation", "instructions"];

/// A single structural violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructureError {
    /// A closing tag matched an entry below the top of the stack.
    Mismatched {
        found: String,
        expected: String,
        line: usize,
    },
    /// A closing tag with no open counterpart anywhere on the stack.
    UnexpectedClosing { name: String, line: usize },
    /// Tags still open at end of input, outermost first.
    Unclosed { tags: Vec<String> },
    /// A required section never appeared as a complete open/close pair.
    MissingSection { name: String },
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mismatched {
                found,
                expected,
                line,
            } => write!(
                f,
                "Mismatched closing tag </{}> at line {}: expected </{}>",
                found, line, expected
            ),
            Self::UnexpectedClosing { name, line } => {
                write!(f, "Unexpected closing tag </{}> at line {}", name, line)
            }
            Self::Unclosed { tags } => write!(f, "Unclosed tags: {}", tags.join(", ")),
            Self::MissingSection { name } => write!(f, "Missing required section: {}", name),
        }
    }
}

/// Outcome of validating one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureReport {
    pub errors: Vec<StructureError>,
    /// Names that were closed at least once.
    pub completed: BTreeSet<String>,
}

impl StructureReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates section markers. All violations are collected; any single one
/// makes the document invalid.
#[derive(Debug, Clone)]
pub struct StructureValidator {
    required: Vec<String>,
}

impl Default for StructureValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureValidator {
    pub fn new() -> Self {
        Self {
            required: REQUIRED_SECTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_required(mut self, required: &[&str]) -> Self {
        self.required = required.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn validate_document(&self, document: &Document) -> StructureReport {
        let code_blocks = crate::parser::CodeBlockExtractor::extract_all(document.text());
        let report = self.validate_tokens(&tokenize(document.text(), &code_blocks));
        trace!(
            file = document.relative_path(),
            errors = report.errors.len(),
            "Structure validated"
        );
        report
    }

    /// Run the balance check over an already tokenized stream.
    pub fn validate_tokens(&self, tokens: &[TagToken]) -> StructureReport {
        let mut report = StructureReport::default();
        let mut stack: Vec<&str> = Vec::new();

        for token in tokens {
            match token.kind {
                TagKind::SelfClosing => {}
                TagKind::Open => stack.push(&token.name),
                TagKind::Close => {
                    if stack.last() == Some(&token.name.as_str()) {
                        stack.pop();
                        report.completed.insert(token.name.clone());
                    } else if let Some(pos) = stack.iter().rposition(|n| *n == token.name) {
                        report.errors.push(StructureError::Mismatched {
                            found: token.name.clone(),
                            expected: stack.last().map(|s| s.to_string()).unwrap_or_default(),
                            line: token.line,
                        });
                        // Recover by closing everything above the match.
                        stack.truncate(pos);
                        report.completed.insert(token.name.clone());
                    } else {
                        report.errors.push(StructureError::UnexpectedClosing {
                            name: token.name.clone(),
                            line: token.line,
                        });
                    }
                }
            }
        }

        if !stack.is_empty() {
            report.errors.push(StructureError::Unclosed {
                tags: stack.iter().map(|s| s.to_string()).collect(),
            });
        }

        for name in &self.required {
            if !report.completed.contains(name) {
                report.errors.push(StructureError::MissingSection { name: name.clone() });
            }
        }

        report
    }

    /// Convenience wrapper returning validity and appending error messages.
    pub fn validate(&self, document: &Document, errors: &mut Vec<String>) -> bool {
        let report = self.validate_document(document);
        errors.extend(report.errors.iter().map(ToString::to_string));
        report.is_valid()
    }
}
