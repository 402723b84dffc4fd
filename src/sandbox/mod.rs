//! Optional container-backed verification of risky snippets.
//!
//! The container runtime is an external collaborator reached through the
//! `Sandbox` trait. Its absence is never an error: the verifier records a
//! warning and the build keeps its pattern-only results.

mod docker;
mod verifier;

pub use docker::DockerSandbox;
pub use verifier::{CancelHandle, SandboxJob, SandboxVerifier, VerifyOutcome};

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Warning recorded when no sandbox runtime can be used.
pub const UNAVAILABLE_WARNING: &str = "sandbox unavailable, pattern-only validation used";

/// What a finished sandbox run observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxOutput {
    pub stdout: String,
    /// `None` when the process was ended by a signal.
    pub exit_status: Option<i32>,
}

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("sandbox runtime unavailable: {0}")]
    Unavailable(String),

    #[error("sandbox run timed out after {0}s")]
    Timeout(u64),

    #[error("sandbox run failed: {0}")]
    Failed(String),
}

/// An isolated executor for shell snippets.
pub trait Sandbox: Send + Sync {
    /// Whether runs can be attempted at all.
    fn is_available(&self) -> bool;

    /// Run `command` with `working_set` mounted read-only as the working
    /// directory.
    fn run(&self, command: &str, working_set: &Path) -> Result<SandboxOutput, SandboxError>;
}

/// One sandbox run, as recorded in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxRun {
    pub command: String,
    pub file: String,
    /// Display form of the snippet that was run.
    pub snippet: String,
    pub outcome: SandboxOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SandboxOutcome {
    Completed {
        exit_status: Option<i32>,
        stdout: String,
    },
    TimedOut {
        timeout_secs: u64,
    },
    Failed {
        message: String,
    },
}

impl From<Result<SandboxOutput, SandboxError>> for SandboxOutcome {
    fn from(result: Result<SandboxOutput, SandboxError>) -> Self {
        match result {
            Ok(output) => SandboxOutcome::Completed {
                exit_status: output.exit_status,
                stdout: output.stdout,
            },
            Err(SandboxError::Timeout(secs)) => SandboxOutcome::TimedOut { timeout_secs: secs },
            Err(e) => SandboxOutcome::Failed {
                message: e.to_string(),
            },
        }
    }
}
