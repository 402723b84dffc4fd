//! Atomic persistence of a built registry.

use super::integrity::verify_integrity;
use super::types::Registry;
use crate::error::{AuditError, IoOperation, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Write `registry` to `path` as pretty JSON.
///
/// The registry is checked first and never written if it fails integrity.
/// Content goes to a temporary file next to `path` which then replaces it,
/// so readers see either the old file or the complete new one.
pub fn save(registry: &Registry, path: &Path) -> Result<()> {
    verify_integrity(registry)?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| io_error(parent, IoOperation::Create, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| io_error(parent, IoOperation::Create, e))?;
    serde_json::to_writer_pretty(tmp.as_file_mut(), registry)?;
    tmp.write_all(b"\n")
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| AuditError::write_error(tmp.path(), e))?;
    debug!(tmp = %tmp.path().display(), "Registry staged");

    tmp.persist(path)
        .map_err(|e| io_error(path, IoOperation::Rename, e.error))?;

    info!(
        path = %path.display(),
        commands = registry.commands.len(),
        "Registry written"
    );
    Ok(())
}

/// Read a registry written by `save`.
pub fn load(path: &Path) -> Result<Registry> {
    let content = fs::read_to_string(path).map_err(|e| AuditError::read_error(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

fn io_error(path: &Path, operation: IoOperation, source: std::io::Error) -> AuditError {
    AuditError::Io {
        path: path.to_path_buf(),
        operation,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::types::{CommandMetadata, PhaseEntry};
    use crate::safety::SafetyLevel;
    use tempfile::TempDir;

    fn orphan_command() -> CommandMetadata {
        CommandMetadata {
            id: "x".to_string(),
            name: "x".to_string(),
            path: "x.md".to_string(),
            category: "general".to_string(),
            phase: 0,
            description: String::new(),
            usage: String::new(),
            parameters: vec![],
            examples: vec![],
            safety_level: SafetyLevel::Safe,
            quality_score: 30,
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".cmd-audit").join("registry.json");
        let registry = Registry::empty();

        save(&registry, &path).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, registry);
    }

    #[test]
    fn test_save_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        fs::write(&path, "stale").unwrap();

        save(&Registry::empty(), &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with('{'));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_invalid_registry_not_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        let mut registry = Registry::empty();
        registry.commands.insert("x".to_string(), orphan_command());
        registry.phases.push(PhaseEntry {
            id: 0,
            commands: vec!["x".to_string()],
        });

        let err = save(&registry, &path).unwrap_err();
        assert!(matches!(err, AuditError::Integrity(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(load(&dir.path().join("nope.json")).is_err());
    }
}
