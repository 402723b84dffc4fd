//! Post-build referential integrity check.
//!
//! Runs after every assembly and before every write. Any violation aborts
//! the build; a registry that fails here is never persisted.

use super::types::Registry;
use crate::error::{AuditError, Result};
use crate::safety::SafetyLevel;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityViolation {
    #[error("command {command} references unknown category {category}")]
    UnknownCategory { command: String, category: String },

    #[error("command {command} references phase {phase} missing from phases")]
    UnknownPhase { command: String, phase: u32 },

    #[error("command {command} has phase {phase} but category {category} is phase {expected}")]
    CategoryPhaseMismatch {
        command: String,
        category: String,
        phase: u32,
        expected: u32,
    },

    #[error("command {command} is not listed under phase {phase}")]
    NotListedInPhase { command: String, phase: u32 },

    #[error("phase {phase} lists unknown command {command}")]
    PhaseListsUnknownCommand { phase: u32, command: String },

    #[error("category {category} records {recorded} commands but {actual} reference it")]
    CommandCountMismatch {
        category: String,
        recorded: usize,
        actual: usize,
    },

    #[error("phase {next} follows phase {previous}; phases must be strictly ascending")]
    PhaseOrder { previous: u32, next: u32 },

    #[error("command {command} is stored as {recorded} but its findings give {recomputed}")]
    SafetyLevelDrift {
        command: String,
        recorded: SafetyLevel,
        recomputed: SafetyLevel,
    },

    #[error("command key {key} does not match its id {id}")]
    IdMismatch { key: String, id: String },
}

/// Every violation in `registry`, in a stable order.
pub fn check(registry: &Registry) -> Vec<IntegrityViolation> {
    let mut violations = Vec::new();

    for pair in registry.phases.windows(2) {
        if pair[1].id <= pair[0].id {
            violations.push(IntegrityViolation::PhaseOrder {
                previous: pair[0].id,
                next: pair[1].id,
            });
        }
    }

    let mut category_counts: BTreeMap<&str, usize> = BTreeMap::new();

    for (key, command) in &registry.commands {
        if *key != command.id {
            violations.push(IntegrityViolation::IdMismatch {
                key: key.clone(),
                id: command.id.clone(),
            });
        }

        match registry.categories.get(&command.category) {
            Some(info) => {
                *category_counts.entry(command.category.as_str()).or_insert(0) += 1;
                if info.phase != command.phase {
                    violations.push(IntegrityViolation::CategoryPhaseMismatch {
                        command: command.id.clone(),
                        category: command.category.clone(),
                        phase: command.phase,
                        expected: info.phase,
                    });
                }
            }
            None => violations.push(IntegrityViolation::UnknownCategory {
                command: command.id.clone(),
                category: command.category.clone(),
            }),
        }

        match registry.phases.iter().find(|p| p.id == command.phase) {
            Some(entry) if !entry.commands.contains(&command.id) => {
                violations.push(IntegrityViolation::NotListedInPhase {
                    command: command.id.clone(),
                    phase: command.phase,
                });
            }
            Some(_) => {}
            None => violations.push(IntegrityViolation::UnknownPhase {
                command: command.id.clone(),
                phase: command.phase,
            }),
        }

        let recomputed = SafetyLevel::from_findings(registry.findings_for(&command.path));
        if recomputed != command.safety_level {
            violations.push(IntegrityViolation::SafetyLevelDrift {
                command: command.id.clone(),
                recorded: command.safety_level,
                recomputed,
            });
        }
    }

    for phase in &registry.phases {
        for id in &phase.commands {
            if !registry.commands.contains_key(id) {
                violations.push(IntegrityViolation::PhaseListsUnknownCommand {
                    phase: phase.id,
                    command: id.clone(),
                });
            }
        }
    }

    for (name, info) in &registry.categories {
        let actual = category_counts.get(name.as_str()).copied().unwrap_or(0);
        if info.command_count != actual {
            violations.push(IntegrityViolation::CommandCountMismatch {
                category: name.clone(),
                recorded: info.command_count,
                actual,
            });
        }
    }

    violations
}

/// Fails with `AuditError::Integrity` when `check` finds anything.
pub fn verify_integrity(registry: &Registry) -> Result<()> {
    let violations = check(registry);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(AuditError::Integrity(violations))
    }
}
