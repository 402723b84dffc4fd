use super::{Sandbox, SandboxError, SandboxOutput};
use crate::config::SandboxConfig;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const PIDS_LIMIT: &str = "64";
const MOUNT_POINT: &str = "/work";
/// Captured stdout is cut to this many bytes.
const MAX_STDOUT: usize = 4096;

static CONTAINER_SEQ: AtomicU64 = AtomicU64::new(0);

/// Unique per process and run, so a timed-out container can be addressed.
fn container_name() -> String {
    let seq = CONTAINER_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("cmd-audit-{}-{seq}", std::process::id())
}

/// Runs snippets in a throwaway container with no network, a read-only
/// root filesystem and the working set mounted read-only.
#[derive(Debug)]
pub struct DockerSandbox {
    runtime: String,
    image: String,
    memory: String,
    timeout: Duration,
    available: OnceLock<bool>,
}

impl DockerSandbox {
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            runtime: config.runtime.clone(),
            image: config.image.clone(),
            memory: config.memory.clone(),
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
            available: OnceLock::new(),
        }
    }

    fn probe(&self) -> bool {
        let status = Command::new(&self.runtime)
            .arg("version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(s) if s.success() => true,
            Ok(s) => {
                debug!(runtime = %self.runtime, code = ?s.code(), "Sandbox runtime probe failed");
                false
            }
            Err(e) => {
                debug!(runtime = %self.runtime, error = %e, "Sandbox runtime not found");
                false
            }
        }
    }

    fn args(&self, name: &str, command: &str, working_set: &Path) -> Vec<String> {
        vec![
            "run".to_string(),
            "--rm".to_string(),
            "--name".to_string(),
            name.to_string(),
            "--network".to_string(),
            "none".to_string(),
            "--read-only".to_string(),
            "--memory".to_string(),
            self.memory.clone(),
            "--pids-limit".to_string(),
            PIDS_LIMIT.to_string(),
            "--cap-drop".to_string(),
            "ALL".to_string(),
            "--security-opt".to_string(),
            "no-new-privileges".to_string(),
            "-v".to_string(),
            format!("{}:{MOUNT_POINT}:ro", working_set.display()),
            "-w".to_string(),
            MOUNT_POINT.to_string(),
            self.image.clone(),
            "sh".to_string(),
            "-c".to_string(),
            command.to_string(),
        ]
    }

    /// Killing the client does not stop the container it started.
    fn remove_container(&self, name: &str) {
        for args in [vec!["kill", name], vec!["rm", "-f", name]] {
            let status = Command::new(&self.runtime)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
            match status {
                Ok(s) if s.success() => {}
                Ok(s) => {
                    warn!(container = name, action = args[0], code = ?s.code(), "Container cleanup failed")
                }
                Err(e) => {
                    warn!(container = name, action = args[0], error = %e, "Container cleanup failed")
                }
            }
        }
    }
}

impl Sandbox for DockerSandbox {
    fn is_available(&self) -> bool {
        *self.available.get_or_init(|| self.probe())
    }

    fn run(&self, command: &str, working_set: &Path) -> Result<SandboxOutput, SandboxError> {
        if !self.is_available() {
            return Err(SandboxError::Unavailable(format!(
                "`{} version` failed",
                self.runtime
            )));
        }

        let mut capture = tempfile::tempfile()
            .map_err(|e| SandboxError::Failed(format!("create capture file: {e}")))?;
        let stdout = capture
            .try_clone()
            .map_err(|e| SandboxError::Failed(format!("clone capture file: {e}")))?;

        let name = container_name();
        let mut child = Command::new(&self.runtime)
            .args(self.args(&name, command, working_set))
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => SandboxError::Unavailable(e.to_string()),
                _ => SandboxError::Failed(format!("spawn {}: {e}", self.runtime)),
            })?;

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if started.elapsed() > self.timeout {
                        if let Err(e) = child.kill() {
                            warn!(error = %e, "Failed to kill sandbox client");
                        }
                        let _ = child.wait();
                        self.remove_container(&name);
                        warn!(
                            container = %name,
                            timeout_secs = self.timeout.as_secs(),
                            "Sandbox run timed out"
                        );
                        return Err(SandboxError::Timeout(self.timeout.as_secs()));
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => return Err(SandboxError::Failed(format!("wait: {e}"))),
            }
        };

        let mut bytes = Vec::new();
        capture
            .seek(SeekFrom::Start(0))
            .and_then(|_| capture.by_ref().take(MAX_STDOUT as u64).read_to_end(&mut bytes))
            .map_err(|e| SandboxError::Failed(format!("read capture file: {e}")))?;

        debug!(
            code = ?status.code(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Sandbox run finished"
        );

        Ok(SandboxOutput {
            stdout: String::from_utf8_lossy(&bytes).into_owned(),
            exit_status: status.code(),
        })
    }
}
