//! Per-file pipeline and registry assembly.
//!
//! Each document goes through extraction, structure validation, the rule
//! engine, classification and scoring on its own, producing a `FileReport`.
//! Reports are computed in parallel and merged by a single writer.

use super::integrity::verify_integrity;
use super::metadata::{MetadataExtractor, command_id};
use super::phases::CategoryTable;
use super::types::{
    CategoryInfo, CommandMetadata, FileIssue, PhaseEntry, QualityMetric, Registry, Warning,
};
use crate::config::Config;
use crate::discovery::{DirectoryWalker, WalkConfig};
use crate::error::{AuditError, Result};
use crate::parser::Document;
use crate::rules::{Finding, RuleEngine};
use crate::safety::SafetyLevel;
use crate::sandbox::{SandboxJob, SandboxVerifier};
use crate::scoring::{LOW_QUALITY_THRESHOLD, QualityReport, QualityScorer};
use crate::structure::StructureValidator;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything learned about one file. Built without touching shared state.
#[derive(Debug, Clone)]
pub struct FileReport {
    /// Root-relative path.
    pub file: String,
    /// Present only when the document is structurally valid.
    pub command: Option<CommandMetadata>,
    pub findings: Vec<Finding>,
    pub quality: Option<QualityReport>,
    pub warnings: Vec<String>,
    /// Per-file failures: unreadable file or structural violations.
    pub errors: Vec<String>,
    /// Code segments with at least one finding, in segment order.
    pub flagged_snippets: Vec<String>,
    pub directory: PathBuf,
}

impl FileReport {
    fn failed(file: String, directory: PathBuf, error: String) -> Self {
        Self {
            file,
            command: None,
            findings: Vec::new(),
            quality: None,
            warnings: Vec::new(),
            errors: vec![error],
            flagged_snippets: Vec::new(),
            directory,
        }
    }

    pub fn safety_level(&self) -> SafetyLevel {
        SafetyLevel::from_findings(&self.findings)
    }
}

pub struct RegistryBuilder {
    walker: DirectoryWalker,
    engine: RuleEngine,
    validator: StructureValidator,
    table: CategoryTable,
    sandbox: Option<SandboxVerifier>,
}

impl RegistryBuilder {
    pub fn new(config: &Config) -> Self {
        Self {
            walker: DirectoryWalker::new(WalkConfig::from(&config.discovery)),
            engine: RuleEngine::new().with_min_secret_length(config.security.min_secret_length),
            validator: StructureValidator::new(),
            table: CategoryTable::from_mappings(&config.categories),
            sandbox: None,
        }
    }

    pub fn with_walk_config(mut self, config: WalkConfig) -> Self {
        self.walker = DirectoryWalker::new(config);
        self
    }

    pub fn with_sandbox(mut self, verifier: SandboxVerifier) -> Self {
        self.sandbox = Some(verifier);
        self
    }

    pub fn sandbox(&self) -> Option<&SandboxVerifier> {
        self.sandbox.as_ref()
    }

    /// Discover, validate and assemble. Fails on a missing root, a
    /// duplicate command id or an integrity violation; nothing else aborts
    /// the run.
    pub fn build(&self, root: &Path) -> Result<Registry> {
        let files = self.walker.discover(root)?;
        let root = std::path::absolute(root).map_err(|e| AuditError::read_error(root, e))?;
        info!(root = %root.display(), files = files.len(), "Building registry");

        let reports: Vec<FileReport> = files
            .par_iter()
            .map(|path| self.process_file(path, &root))
            .collect();

        let (mut registry, jobs) = self.assemble(reports)?;
        verify_integrity(&registry)?;

        if let Some(verifier) = &self.sandbox {
            let outcome = verifier.verify(&jobs);
            registry.validation_results.sandbox_runs = outcome.runs;
            registry
                .validation_results
                .warnings
                .extend(outcome.warnings.into_iter().map(Warning::run));
        }

        info!(
            total = registry.validation_results.total_files,
            valid = registry.validation_results.valid_files,
            issues = registry.validation_results.security_issues.len(),
            "Registry built"
        );
        Ok(registry)
    }

    pub fn process_file(&self, path: &Path, root: &Path) -> FileReport {
        match Document::load(path, root) {
            Ok(document) => self.process_document(&document),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read document");
                let relative = path.strip_prefix(root).unwrap_or(path);
                FileReport::failed(
                    crate::discovery::normalize_path(relative),
                    parent_dir(path),
                    e.to_string(),
                )
            }
        }
    }

    /// Run the full per-document pipeline.
    pub fn process_document(&self, document: &Document) -> FileReport {
        let file = document.display_path();
        let structure = self.validator.validate_document(document);
        let findings = self.engine.scan_document(document);
        let quality = QualityScorer::score(document);
        let safety_level = SafetyLevel::from_findings(&findings);

        debug!(
            file = %file,
            findings = findings.len(),
            safety = %safety_level,
            score = quality.score,
            valid = structure.is_valid(),
            "Processed document"
        );

        let mut flagged: Vec<usize> = findings.iter().map(|f| f.segment).collect();
        flagged.dedup();
        let flagged_snippets = flagged
            .into_iter()
            .filter_map(|idx| document.segments().get(idx))
            .map(|segment| segment.text.trim_end().to_string())
            .collect();

        let errors: Vec<String> = structure.errors.iter().map(ToString::to_string).collect();
        let command = errors.is_empty().then(|| {
            let meta = MetadataExtractor::extract(document);
            let row = self.table.resolve(document.relative_path());
            CommandMetadata {
                id: command_id(document.relative_path()),
                name: meta.name,
                path: file.clone(),
                category: row.category.clone(),
                phase: row.phase,
                description: meta.description,
                usage: meta.usage,
                parameters: meta.parameters,
                examples: meta.examples,
                safety_level,
                quality_score: quality.score,
            }
        });

        FileReport {
            warnings: advisory_warnings(&quality),
            file,
            command,
            findings,
            quality: Some(quality),
            errors,
            flagged_snippets,
            directory: parent_dir(document.path()),
        }
    }

    /// Single-writer merge of per-file reports, in report order.
    pub fn assemble(&self, reports: Vec<FileReport>) -> Result<(Registry, Vec<SandboxJob>)> {
        let mut registry = Registry::empty();
        let mut jobs = Vec::new();
        let results = &mut registry.validation_results;

        for report in reports {
            results.total_files += 1;

            results.errors.extend(report.errors.iter().map(|message| FileIssue {
                file: report.file.clone(),
                message: message.clone(),
            }));
            results.warnings.extend(
                report
                    .warnings
                    .iter()
                    .map(|message| Warning::for_file(&report.file, message)),
            );
            if let Some(quality) = &report.quality {
                results.quality_metrics.push(QualityMetric {
                    file: report.file.clone(),
                    score: quality.score,
                    missing_sections: quality
                        .missing_sections()
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                    hygiene_markers: quality.hygiene_total(),
                });
            }
            results.security_issues.extend(report.findings);

            let Some(command) = report.command else {
                continue;
            };
            if registry.commands.contains_key(&command.id) {
                return Err(AuditError::DuplicateCommandId(command.id));
            }
            if command.safety_level.is_risky() {
                jobs.extend(report.flagged_snippets.into_iter().map(|snippet| SandboxJob {
                    command: command.id.clone(),
                    file: report.file.clone(),
                    snippet,
                    working_set: report.directory.clone(),
                }));
            }
            registry.commands.insert(command.id.clone(), command);
        }

        let mut phases: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        for command in registry.commands.values() {
            let info = registry
                .categories
                .entry(command.category.clone())
                .or_insert_with(|| CategoryInfo {
                    description: self
                        .table
                        .category(&command.category)
                        .map(|row| row.description.clone())
                        .unwrap_or_default(),
                    phase: command.phase,
                    command_count: 0,
                });
            info.command_count += 1;
            phases.entry(command.phase).or_default().push(command.id.clone());
        }
        registry.phases = phases
            .into_iter()
            .map(|(id, commands)| PhaseEntry { id, commands })
            .collect();
        registry.validation_results.valid_files = registry.commands.len();

        Ok((registry, jobs))
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn advisory_warnings(quality: &QualityReport) -> Vec<String> {
    let mut warnings: Vec<String> = quality
        .missing_sections()
        .into_iter()
        .map(|name| format!("Missing optional section: {name}"))
        .collect();

    if quality.has_usage && !quality.usage_has_code {
        warnings.push("Usage section has no code block".to_string());
    }
    for (marker, count) in &quality.hygiene {
        warnings.push(format!("Found {count} {marker} marker(s)"));
    }
    if quality.score < LOW_QUALITY_THRESHOLD {
        warnings.push(format!(
            "Quality score {} is below {LOW_QUALITY_THRESHOLD}",
            quality.score
        ));
    }
    warnings
}
