//! Static validation of command/prompt definition documents.
//!
//! A build walks a directory of documents and, for each one, extracts its
//! embedded code, checks the required section tags, scans the code for
//! secrets and dangerous commands, classifies it as safe, caution or
//! dangerous, and scores its documentation. The per-file results are merged
//! into a [`Registry`] that is integrity-checked before it is written.
//!
//! ```no_run
//! use cmd_audit::{Config, RegistryBuilder};
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new(".")));
//! let registry = RegistryBuilder::new(&config).build(Path::new("commands"))?;
//! println!("{} commands", registry.commands.len());
//! # Ok::<(), cmd_audit::AuditError>(())
//! ```

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;
pub mod registry;
pub mod reporter;
pub mod rules;
pub mod safety;
pub mod sandbox;
pub mod scoring;
pub mod security;
pub mod structure;

#[cfg(test)]
pub mod test_utils;

pub use cli::{Cli, Command, OutputFormat};
pub use config::Config;
pub use discovery::{DirectoryWalker, WalkConfig};
pub use error::{AuditError, Result};
pub use parser::{CodeBlockExtractor, CodeSegment, Document};
pub use registry::{CommandMetadata, Registry, RegistryBuilder, verify_integrity};
pub use reporter::{Reporter, json::JsonReporter, terminal::TerminalReporter};
pub use rules::{Finding, RuleEngine, Severity, Summary};
pub use safety::SafetyLevel;
pub use sandbox::{DockerSandbox, Sandbox, SandboxVerifier};
pub use scoring::{QualityReport, QualityScorer};
pub use security::{PathGuard, PathSecurityError, SafePath, get_safe_path};
pub use structure::{StructureReport, StructureValidator};
