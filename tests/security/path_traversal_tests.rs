//! Path traversal security tests
//!
//! Paths handed to `check` come from outside the trust boundary. These cover:
//! - Literal `..` sequences
//! - URL-encoded variants
//! - Unicode homoglyphs
//! - Absolute paths and the allow-list

use cmd_audit::config::PathsConfig;
use cmd_audit::security::{PathGuard, PathSecurityError, get_safe_path};
use std::fs;
use tempfile::TempDir;

fn guard(dir: &TempDir) -> PathGuard {
    PathGuard::new(dir.path(), &PathsConfig::default()).unwrap()
}

#[test]
fn test_rejects_literal_parent_reference() {
    let dir = TempDir::new().unwrap();
    let result = guard(&dir).get_safe_path("../../../etc/passwd");
    assert!(
        matches!(result, Err(PathSecurityError::TraversalAttempt(_))),
        "Should reject literal '..' sequence"
    );
}

#[test]
fn test_rejects_nested_parent_reference() {
    let dir = TempDir::new().unwrap();
    let result = guard(&dir).get_safe_path("docs/guides/../../../etc/shadow");
    assert!(result.is_err(), "Should reject '..' after an allowed prefix");
}

#[test]
fn test_rejects_backslash_parent_reference() {
    let dir = TempDir::new().unwrap();
    let result = guard(&dir).get_safe_path("docs\\..\\..\\secret.md");
    assert!(result.unwrap_err().is_traversal());
}

#[test]
fn test_rejects_url_encoded_traversal_lowercase() {
    let dir = TempDir::new().unwrap();
    let result = guard(&dir).get_safe_path("docs/%2e%2e/etc/passwd");
    assert!(
        matches!(result, Err(PathSecurityError::EncodedTraversal(_))),
        "Should reject URL-encoded traversal (%2e%2e)"
    );
}

#[test]
fn test_rejects_url_encoded_traversal_mixed_case() {
    let dir = TempDir::new().unwrap();
    let result = guard(&dir).get_safe_path("docs/%2E%2e/etc/passwd");
    assert!(
        matches!(result, Err(PathSecurityError::EncodedTraversal(_))),
        "Should reject URL-encoded traversal (mixed case)"
    );
}

#[test]
fn test_rejects_double_encoded_traversal() {
    let dir = TempDir::new().unwrap();
    let result = guard(&dir).get_safe_path("docs/%252e%252e/etc/passwd");
    assert!(result.is_err(), "Should reject double URL-encoded traversal");
}

#[test]
fn test_rejects_encoded_separator() {
    let dir = TempDir::new().unwrap();
    assert!(guard(&dir).get_safe_path("docs/..%2fsecret.md").is_err());
    assert!(guard(&dir).get_safe_path("docs/..%5csecret.md").is_err());
}

#[test]
fn test_rejects_unicode_homoglyph() {
    let dir = TempDir::new().unwrap();
    let result = guard(&dir).get_safe_path("docs/\u{2024}\u{2024}/passwd");
    assert!(
        matches!(result, Err(PathSecurityError::HomoglyphTraversal(_))),
        "Should reject ONE DOT LEADER homoglyph"
    );
}

#[test]
fn test_rejects_null_byte() {
    let dir = TempDir::new().unwrap();
    let result = guard(&dir).get_safe_path("docs/guide.md\0.txt");
    assert!(matches!(result, Err(PathSecurityError::NullByteInPath(_))));
}

#[cfg(unix)]
#[test]
fn test_rejects_absolute_path() {
    let dir = TempDir::new().unwrap();
    let result = guard(&dir).get_safe_path("/etc/passwd");
    assert!(matches!(result, Err(PathSecurityError::AbsolutePath(_))));
}

#[test]
fn test_rejects_paths_outside_allow_list() {
    let dir = TempDir::new().unwrap();
    for requested in ["src/main.rs", "Cargo.toml", "docs", "docsextra/guide.md"] {
        assert!(
            matches!(
                guard(&dir).get_safe_path(requested),
                Err(PathSecurityError::NotAllowed(_))
            ),
            "{requested} should not be allowed"
        );
    }
}

#[test]
fn test_accepts_allowed_paths() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("docs/guides")).unwrap();
    fs::write(dir.path().join("docs/guides/setup.md"), "# Setup").unwrap();
    fs::write(dir.path().join("README.md"), "# Readme").unwrap();

    let guard = guard(&dir);
    let nested = guard.get_safe_path("docs/guides/setup.md").unwrap();
    assert!(nested.is_within(guard.root()));
    assert!(nested.canonical().ends_with("docs/guides/setup.md"));

    let top = guard.get_safe_path("./README.md").unwrap();
    assert!(top.canonical().ends_with("README.md"));
}

#[test]
fn test_accepts_missing_file_under_allowed_dir() {
    let dir = TempDir::new().unwrap();
    let path = get_safe_path("commands/new.md", dir.path(), &PathsConfig::default()).unwrap();
    assert!(path.ends_with("commands/new.md"));
}

#[test]
fn test_custom_allow_list() {
    let dir = TempDir::new().unwrap();
    let paths = PathsConfig {
        allowed_files: vec!["AGENTS.md".to_string()],
        allowed_dirs: vec!["/prompts/".to_string()],
    };
    let guard = PathGuard::new(dir.path(), &paths).unwrap();

    assert!(guard.get_safe_path("AGENTS.md").is_ok());
    assert!(guard.get_safe_path("prompts/review.md").is_ok());
    assert!(guard.get_safe_path("docs/guide.md").is_err());
}

#[test]
fn test_legitimate_dots_in_names() {
    let dir = TempDir::new().unwrap();
    assert!(guard(&dir).get_safe_path("docs/v1..2-notes.md").is_ok());
    assert!(guard(&dir).get_safe_path("docs/.hidden.md").is_ok());
}

#[test]
fn test_traversal_reported_for_any_root() {
    let dir = TempDir::new().unwrap();
    for root in [dir.path().to_path_buf(), dir.path().join("does-not-exist")] {
        let err = get_safe_path("../../../etc/passwd", &root, &PathsConfig::default()).unwrap_err();
        assert!(err.is_traversal(), "root {}: {err:?}", root.display());
    }
}
