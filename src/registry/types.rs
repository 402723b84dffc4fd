use crate::rules::{Finding, Severity};
use crate::safety::SafetyLevel;
use crate::sandbox::SandboxRun;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated, persisted output of one build.
///
/// Maps are `BTreeMap` so the serialized registry is byte-stable for the
/// same inputs apart from `generated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub commands: BTreeMap<String, CommandMetadata>,
    pub categories: BTreeMap<String, CategoryInfo>,
    /// Sorted ascending by id, ids unique.
    pub phases: Vec<PhaseEntry>,
    pub validation_results: ValidationResults,
}

impl Registry {
    pub fn empty() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now(),
            commands: BTreeMap::new(),
            categories: BTreeMap::new(),
            phases: Vec::new(),
            validation_results: ValidationResults::default(),
        }
    }

    /// Findings whose source file is `path`.
    pub fn findings_for<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.validation_results
            .security_issues
            .iter()
            .filter(move |f| f.source_file == path)
    }

    /// True when any scanned document has a critical or high finding,
    /// whether or not it made it into `commands`.
    pub fn has_dangerous(&self) -> bool {
        self.validation_results
            .security_issues
            .iter()
            .any(|f| f.severity >= Severity::High)
    }

    pub fn count_by_safety(&self, level: SafetyLevel) -> usize {
        self.commands
            .values()
            .filter(|c| c.safety_level == level)
            .count()
    }
}

/// Metadata of one registered command document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    pub id: String,
    pub name: String,
    /// Root-relative source path.
    pub path: String,
    pub category: String,
    pub phase: u32,
    pub description: String,
    pub usage: String,
    pub parameters: Vec<Parameter>,
    pub examples: Vec<Example>,
    pub safety_level: SafetyLevel,
    pub quality_score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub optional: bool,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub description: String,
    pub phase: u32,
    pub command_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseEntry {
    pub id: u32,
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResults {
    pub total_files: usize,
    pub valid_files: usize,
    pub errors: Vec<FileIssue>,
    pub warnings: Vec<Warning>,
    pub security_issues: Vec<Finding>,
    pub quality_metrics: Vec<QualityMetric>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sandbox_runs: Vec<SandboxRun>,
}

/// A file that could not be validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIssue {
    pub file: String,
    pub message: String,
}

/// Advisory message; `file` is absent for run-level warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub message: String,
}

impl Warning {
    pub fn for_file(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            message: message.into(),
        }
    }

    pub fn run(message: impl Into<String>) -> Self {
        Self {
            file: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityMetric {
    pub file: String,
    pub score: u8,
    pub missing_sections: Vec<String>,
    pub hygiene_markers: usize,
}
