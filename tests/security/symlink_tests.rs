//! Symlink handling tests
//!
//! Covers:
//! - Discovery not following symlinks unless configured
//! - Symlinked paths that resolve outside the project root
//! - Symlinks that stay inside the root

use cmd_audit::config::PathsConfig;
use cmd_audit::discovery::{DirectoryWalker, WalkConfig};
use cmd_audit::security::{PathGuard, PathSecurityError};
use std::fs;
use tempfile::TempDir;

#[cfg(unix)]
use std::os::unix::fs::symlink;

#[cfg(unix)]
#[test]
fn test_discovery_skips_symlinked_directory_by_default() {
    let outside = TempDir::new().unwrap();
    fs::write(outside.path().join("secret.md"), "# Outside").unwrap();

    let root = TempDir::new().unwrap();
    fs::write(root.path().join("inside.md"), "# Inside").unwrap();
    symlink(outside.path(), root.path().join("linked")).unwrap();

    let files = DirectoryWalker::new(WalkConfig::default())
        .discover(root.path())
        .unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("inside.md"));
}

#[cfg(unix)]
#[test]
fn test_discovery_follows_symlinks_when_enabled() {
    let outside = TempDir::new().unwrap();
    fs::write(outside.path().join("shared.md"), "# Shared").unwrap();

    let root = TempDir::new().unwrap();
    symlink(outside.path(), root.path().join("linked")).unwrap();

    let files = DirectoryWalker::new(WalkConfig::default().with_follow_symlinks(true))
        .discover(root.path())
        .unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("linked/shared.md"));
}

#[cfg(unix)]
#[test]
fn test_guard_rejects_symlink_escaping_root() {
    let outside = TempDir::new().unwrap();
    fs::write(outside.path().join("passwd"), "root:x:0:0").unwrap();

    let root = TempDir::new().unwrap();
    fs::create_dir_all(root.path().join("docs")).unwrap();
    symlink(outside.path().join("passwd"), root.path().join("docs/guide.md")).unwrap();

    let guard = PathGuard::new(root.path(), &PathsConfig::default()).unwrap();
    let result = guard.get_safe_path("docs/guide.md");
    assert!(
        matches!(result, Err(PathSecurityError::EscapesRoot(_))),
        "Should reject a symlink that resolves outside the root"
    );
}

#[cfg(unix)]
#[test]
fn test_guard_rejects_symlinked_directory_escaping_root() {
    let outside = TempDir::new().unwrap();
    fs::write(outside.path().join("notes.md"), "# Notes").unwrap();

    let root = TempDir::new().unwrap();
    symlink(outside.path(), root.path().join("docs")).unwrap();

    let guard = PathGuard::new(root.path(), &PathsConfig::default()).unwrap();
    assert!(guard.get_safe_path("docs/notes.md").is_err());
}

#[cfg(unix)]
#[test]
fn test_guard_accepts_symlink_within_root() {
    let root = TempDir::new().unwrap();
    fs::create_dir_all(root.path().join("docs")).unwrap();
    fs::write(root.path().join("docs/real.md"), "# Real").unwrap();
    symlink(root.path().join("docs/real.md"), root.path().join("docs/alias.md")).unwrap();

    let guard = PathGuard::new(root.path(), &PathsConfig::default()).unwrap();
    let safe = guard.get_safe_path("docs/alias.md").unwrap();
    assert!(safe.canonical().ends_with("docs/real.md"));
}

#[test]
fn test_reads_normal_tree() {
    let root = TempDir::new().unwrap();
    fs::create_dir_all(root.path().join("docs")).unwrap();
    fs::write(root.path().join("docs/guide.md"), "# Guide").unwrap();

    let guard = PathGuard::new(root.path(), &PathsConfig::default()).unwrap();
    let safe = guard.get_safe_path("docs/guide.md").unwrap();
    assert_eq!(fs::read_to_string(safe.canonical()).unwrap(), "# Guide");
}

#[cfg(unix)]
#[test]
fn test_guard_rejects_new_file_under_symlinked_allowed_dir() {
    let outside = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    symlink(outside.path(), root.path().join("docs")).unwrap();

    let guard = PathGuard::new(root.path(), &PathsConfig::default()).unwrap();
    assert!(
        matches!(guard.get_safe_path("docs/new.md"), Err(PathSecurityError::EscapesRoot(_))),
        "A missing file below a symlinked directory must be resolved through the link"
    );
}
