//! Path validation and traversal prevention
//!
//! Any path that arrives from outside the trust boundary (a CLI argument,
//! for instance) is resolved through `PathGuard` before it is read.

use crate::config::PathsConfig;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during path security validation
#[derive(Debug, Error)]
pub enum PathSecurityError {
    #[error("Path traversal attempt detected: {}", .0.display())]
    TraversalAttempt(PathBuf),

    #[error("Encoded path traversal detected: {}", .0.display())]
    EncodedTraversal(PathBuf),

    #[error("Unicode homoglyph traversal detected: {}", .0.display())]
    HomoglyphTraversal(PathBuf),

    #[error("Path contains null byte")]
    NullByteInPath(PathBuf),

    #[error("Absolute paths are not accepted: {}", .0.display())]
    AbsolutePath(PathBuf),

    #[error("Path is outside the allowed files and directories: {}", .0.display())]
    NotAllowed(PathBuf),

    #[error("Path resolves outside the project root: {}", .0.display())]
    EscapesRoot(PathBuf),

    #[error("Failed to canonicalize path: {}", path.display())]
    CanonicalizeFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PathSecurityError {
    pub fn is_traversal(&self) -> bool {
        matches!(
            self,
            Self::TraversalAttempt(_) | Self::EncodedTraversal(_) | Self::HomoglyphTraversal(_)
        )
    }
}

/// A validated path inside the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafePath {
    canonical: PathBuf,
    original: PathBuf,
}

impl SafePath {
    /// Absolute path under the root. Symlinks are resolved when the target
    /// exists.
    pub fn canonical(&self) -> &Path {
        &self.canonical
    }

    /// Get the original path as provided
    pub fn original(&self) -> &Path {
        &self.original
    }

    pub fn is_within(&self, boundary: &Path) -> bool {
        self.canonical.starts_with(boundary)
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.canonical
    }
}

/// Allow-list guard anchored at a project root.
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
    allowed_files: Vec<String>,
    allowed_dirs: Vec<String>,
}

impl PathGuard {
    pub fn new(root: &Path, paths: &PathsConfig) -> Result<Self, PathSecurityError> {
        let root = root
            .canonicalize()
            .map_err(|e| PathSecurityError::CanonicalizeFailed {
                path: root.to_path_buf(),
                source: e,
            })?;
        Ok(Self {
            root,
            allowed_files: paths.allowed_files.clone(),
            allowed_dirs: paths
                .allowed_dirs
                .iter()
                .map(|d| d.trim_matches('/').to_string())
                .filter(|d| !d.is_empty())
                .collect(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate `requested`, relative to the root, and return where it
    /// lives.
    ///
    /// Rejects traversal segments (literal, percent-encoded or homoglyph),
    /// absolute paths, anything not named in the allow-list, and existing
    /// paths whose symlinks lead out of the root.
    pub fn get_safe_path(&self, requested: impl AsRef<Path>) -> Result<SafePath, PathSecurityError> {
        let original = requested.as_ref().to_path_buf();
        check_traversal_patterns(&original)?;

        if original.is_absolute() || original.has_root() {
            return Err(PathSecurityError::AbsolutePath(original));
        }

        let segments: Vec<&str> = original
            .to_str()
            .ok_or_else(|| PathSecurityError::NotAllowed(original.clone()))?
            .split(['/', '\\'])
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        let normalized = segments.join("/");

        if !self.is_allowed(&normalized) {
            return Err(PathSecurityError::NotAllowed(original));
        }

        let canonical = resolve_existing(&self.root.join(&normalized))?;

        if !canonical.starts_with(&self.root) {
            return Err(PathSecurityError::EscapesRoot(original));
        }

        Ok(SafePath {
            canonical,
            original,
        })
    }

    fn is_allowed(&self, normalized: &str) -> bool {
        if self.allowed_files.iter().any(|f| f == normalized) {
            return true;
        }
        self.allowed_dirs.iter().any(|dir| {
            normalized
                .strip_prefix(dir.as_str())
                .is_some_and(|rest| rest.starts_with('/') && rest.len() > 1)
        })
    }
}

/// Canonicalize the deepest existing ancestor of `path` and re-append the
/// missing tail, so a symlinked parent of a not-yet-created file is still
/// resolved before the containment check.
fn resolve_existing(path: &Path) -> Result<PathBuf, PathSecurityError> {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        match existing.canonicalize() {
            Ok(mut resolved) => {
                resolved.extend(missing.iter().rev());
                return Ok(resolved);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // a dangling symlink has no target to check
                let dangling = existing.symlink_metadata().is_ok();
                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) if !dangling => {
                        missing.push(name.to_os_string());
                        existing = parent;
                    }
                    _ => {
                        return Err(PathSecurityError::CanonicalizeFailed {
                            path: path.to_path_buf(),
                            source: e,
                        });
                    }
                }
            }
            Err(e) => {
                return Err(PathSecurityError::CanonicalizeFailed {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        }
    }
}

/// One-shot form of `PathGuard::get_safe_path`.
///
/// The requested path is checked for traversal before the root is touched,
/// so traversal is reported as such even when the root does not exist.
pub fn get_safe_path(
    requested: impl AsRef<Path>,
    root: &Path,
    paths: &PathsConfig,
) -> Result<PathBuf, PathSecurityError> {
    check_traversal_patterns(requested.as_ref())?;
    PathGuard::new(root, paths)?
        .get_safe_path(requested)
        .map(SafePath::into_path_buf)
}

/// Check for various path traversal patterns
///
/// Usable on paths that do not exist yet.
pub fn check_traversal_patterns(path: &Path) -> Result<(), PathSecurityError> {
    let path_str = path.to_string_lossy();

    if path_str.contains('\0') {
        return Err(PathSecurityError::NullByteInPath(path.to_path_buf()));
    }

    let has_parent_segment = path.components().any(|c| c == Component::ParentDir)
        || path_str.split(['/', '\\']).any(|s| s == "..");
    if has_parent_segment {
        return Err(PathSecurityError::TraversalAttempt(path.to_path_buf()));
    }

    // URL-encoded variants (case-insensitive)
    let path_lower = path_str.to_lowercase();
    let encoded_patterns = [
        "%2e%2e", // ..
        "%252e",  // %2e (double-encoded)
        "..%2f",  // ../
        "%2f..",  // /..
        "..%5c",  // ..\
    ];
    if encoded_patterns.iter().any(|p| path_lower.contains(p)) {
        return Err(PathSecurityError::EncodedTraversal(path.to_path_buf()));
    }

    // U+2024 (ONE DOT LEADER) looks like '.'
    if path_str.contains('\u{2024}') {
        return Err(PathSecurityError::HomoglyphTraversal(path.to_path_buf()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn guard(dir: &TempDir) -> PathGuard {
        PathGuard::new(dir.path(), &PathsConfig::default()).unwrap()
    }

    #[test]
    fn test_rejects_literal_traversal() {
        let dir = TempDir::new().unwrap();
        let err = guard(&dir).get_safe_path("../../../etc/passwd").unwrap_err();
        assert!(matches!(err, PathSecurityError::TraversalAttempt(_)));
    }

    #[test]
    fn test_rejects_traversal_inside_allowed_dir() {
        let dir = TempDir::new().unwrap();
        let err = guard(&dir).get_safe_path("docs/../../secret.md").unwrap_err();
        assert!(err.is_traversal());
    }

    #[test]
    fn test_rejects_url_encoded() {
        let dir = TempDir::new().unwrap();
        let err = guard(&dir).get_safe_path("docs/%2e%2e/etc/passwd").unwrap_err();
        assert!(matches!(err, PathSecurityError::EncodedTraversal(_)));
    }

    #[test]
    fn test_rejects_homoglyph() {
        let dir = TempDir::new().unwrap();
        let err = guard(&dir).get_safe_path("docs/\u{2024}\u{2024}/x.md").unwrap_err();
        assert!(matches!(err, PathSecurityError::HomoglyphTraversal(_)));
    }

    #[test]
    fn test_dots_inside_names_allowed() {
        assert!(check_traversal_patterns(Path::new("docs/v1..2.md")).is_ok());
    }

    #[test]
    fn test_allowed_dir_path_under_root() {
        let dir = TempDir::new().unwrap();
        let guard = guard(&dir);
        let safe = guard.get_safe_path("docs/guide.md").unwrap();
        assert!(safe.canonical().starts_with(guard.root().join("docs")));
        assert_eq!(safe.original(), Path::new("docs/guide.md"));
    }

    #[test]
    fn test_allowed_root_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README.md"), "# readme").unwrap();
        let guard = guard(&dir);
        let safe = guard.get_safe_path("./README.md").unwrap();
        assert_eq!(safe.canonical(), guard.root().join("README.md"));
    }

    #[test]
    fn test_rejects_unlisted_paths() {
        let dir = TempDir::new().unwrap();
        let guard = guard(&dir);
        for path in ["src/main.rs", "docs", "docsx/a.md", "notes.md"] {
            let err = guard.get_safe_path(path).unwrap_err();
            assert!(matches!(err, PathSecurityError::NotAllowed(_)), "{path}");
        }
    }

    #[test]
    fn test_rejects_absolute() {
        let dir = TempDir::new().unwrap();
        let err = guard(&dir).get_safe_path("/etc/passwd").unwrap_err();
        assert!(matches!(err, PathSecurityError::AbsolutePath(_)));
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = PathGuard::new(&dir.path().join("missing"), &PathsConfig::default()).unwrap_err();
        assert!(matches!(err, PathSecurityError::CanonicalizeFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.md"), "s").unwrap();
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret.md"), dir.path().join("docs/link.md"))
            .unwrap();

        let err = guard(&dir).get_safe_path("docs/link.md").unwrap_err();
        assert!(matches!(err, PathSecurityError::EscapesRoot(_)));
    }

    #[test]
    fn test_one_shot_traversal_with_missing_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("no-such-root");
        let err = get_safe_path("../../../etc/passwd", &missing, &PathsConfig::default()).unwrap_err();
        assert!(err.is_traversal(), "{err:?}");
        assert!(matches!(err, PathSecurityError::TraversalAttempt(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_under_symlinked_dir_rejected() {
        let outside = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("docs")).unwrap();

        let err = guard(&dir).get_safe_path("docs/new.md").unwrap_err();
        assert!(matches!(err, PathSecurityError::EscapesRoot(_)));
    }

    #[test]
    fn test_missing_nested_path_resolved_under_root() {
        let dir = TempDir::new().unwrap();
        let guard = guard(&dir);
        let safe = guard.get_safe_path("docs/guides/deep/new.md").unwrap();
        assert_eq!(safe.canonical(), guard.root().join("docs/guides/deep/new.md"));
    }

    #[test]
    fn test_one_shot_helper() {
        let dir = TempDir::new().unwrap();
        let path = get_safe_path("commands/x.md", dir.path(), &PathsConfig::default()).unwrap();
        assert!(path.ends_with("commands/x.md"));
    }
}
