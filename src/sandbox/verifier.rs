use super::{DockerSandbox, Sandbox, SandboxError, SandboxOutcome, SandboxRun, UNAVAILABLE_WARNING};
use crate::config::SandboxConfig;
use crate::rules::heuristics::truncate_match;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// A snippet queued for a sandbox run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxJob {
    pub command: String,
    pub file: String,
    pub snippet: String,
    pub working_set: PathBuf,
}

/// Runs and warnings produced by one verification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyOutcome {
    pub runs: Vec<SandboxRun>,
    pub warnings: Vec<String>,
    /// Jobs never started because of cancellation.
    pub skipped: usize,
}

/// Stops a verifier from starting new runs. Runs already in flight finish
/// and keep their results.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Schedules sandbox runs on a dedicated pool capped at `max_concurrent`
/// threads, so no more than that many containers exist at once.
pub struct SandboxVerifier {
    sandbox: Arc<dyn Sandbox>,
    max_concurrent: usize,
    cancel: CancelHandle,
}

impl SandboxVerifier {
    pub fn new(sandbox: Arc<dyn Sandbox>, max_concurrent: usize) -> Self {
        Self {
            sandbox,
            max_concurrent: max_concurrent.max(1),
            cancel: CancelHandle::default(),
        }
    }

    pub fn from_config(config: &SandboxConfig) -> Self {
        Self::new(Arc::new(DockerSandbox::new(config)), config.max_concurrent)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn verify(&self, jobs: &[SandboxJob]) -> VerifyOutcome {
        if jobs.is_empty() {
            return VerifyOutcome::default();
        }

        if !self.sandbox.is_available() {
            warn!(jobs = jobs.len(), "{UNAVAILABLE_WARNING}");
            return VerifyOutcome {
                warnings: vec![UNAVAILABLE_WARNING.to_string()],
                ..VerifyOutcome::default()
            };
        }

        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_concurrent)
            .thread_name(|i| format!("cmd-audit-sandbox-{i}"))
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                warn!(error = %e, "Failed to start sandbox pool");
                return VerifyOutcome {
                    warnings: vec![format!("sandbox pool unavailable ({e}), pattern-only validation used")],
                    ..VerifyOutcome::default()
                };
            }
        };

        info!(jobs = jobs.len(), max_concurrent = self.max_concurrent, "Starting sandbox runs");

        let results: Vec<Option<(SandboxRun, bool)>> = pool.install(|| {
            jobs.par_iter()
                .map(|job| {
                    if self.cancel.is_cancelled() {
                        return None;
                    }
                    debug!(command = %job.command, "Sandbox run");
                    let result = self.sandbox.run(&job.snippet, &job.working_set);
                    let unavailable = matches!(result, Err(SandboxError::Unavailable(_)));
                    let run = SandboxRun {
                        command: job.command.clone(),
                        file: job.file.clone(),
                        snippet: truncate_match(&job.snippet),
                        outcome: SandboxOutcome::from(result),
                    };
                    Some((run, unavailable))
                })
                .collect()
        });

        let mut outcome = VerifyOutcome::default();
        let mut lost_runtime = false;
        for result in results {
            match result {
                Some((run, unavailable)) => {
                    lost_runtime |= unavailable;
                    outcome.runs.push(run);
                }
                None => outcome.skipped += 1,
            }
        }
        if lost_runtime {
            outcome.warnings.push(UNAVAILABLE_WARNING.to_string());
        }
        if outcome.skipped > 0 {
            info!(skipped = outcome.skipped, "Sandbox runs cancelled");
            outcome
                .warnings
                .push(format!("sandbox cancelled, {} run(s) not started", outcome.skipped));
        }
        outcome
    }
}
