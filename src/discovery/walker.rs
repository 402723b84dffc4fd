//! Directory walking for document discovery.

use crate::config::DiscoveryConfig;
use crate::error::{AuditError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

/// Configuration for directory walking.
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// File extensions to include (e.g., ["md"]), without the leading dot.
    pub file_extensions: Vec<String>,
    /// Substrings matched against the normalized absolute path.
    pub exclude: Vec<String>,
    /// Maximum depth to traverse. None means unlimited.
    pub max_depth: Option<usize>,
    /// Whether to follow symbolic links.
    pub follow_symlinks: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self::from(&DiscoveryConfig::default())
    }
}

impl From<&DiscoveryConfig> for WalkConfig {
    fn from(config: &DiscoveryConfig) -> Self {
        Self {
            file_extensions: config.extensions.clone(),
            exclude: config.exclude.clone(),
            max_depth: None,
            follow_symlinks: config.follow_symlinks,
        }
    }
}

impl WalkConfig {
    /// Set file extensions to include.
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.file_extensions = extensions.iter().map(|e| e.to_string()).collect();
        self
    }

    /// Replace the exclusion patterns.
    pub fn with_exclude(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Set maximum depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set whether to follow symlinks.
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }
}

/// Unify separators so exclusion patterns behave the same on every platform.
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Recursive document walker.
pub struct DirectoryWalker {
    config: WalkConfig,
}

impl DirectoryWalker {
    pub fn new(config: WalkConfig) -> Self {
        Self { config }
    }

    /// Case-sensitive containment check against the normalized path.
    pub fn is_excluded(&self, path: &Path, is_dir: bool) -> bool {
        let mut normalized = normalize_path(path);
        if is_dir {
            normalized.push('/');
        }
        self.config
            .exclude
            .iter()
            .any(|pattern| !pattern.is_empty() && normalized.contains(pattern.as_str()))
    }

    fn matches_extension(&self, path: &Path) -> bool {
        if self.config.file_extensions.is_empty() {
            return true;
        }

        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.config.file_extensions.iter().any(|e| e == ext))
    }

    fn keep_entry(&self, entry: &DirEntry) -> bool {
        // The root is never subject to exclusion; only what lies beneath it.
        entry.depth() == 0 || !self.is_excluded(entry.path(), entry.file_type().is_dir())
    }

    /// Walk `root` depth-first and return every matching file, sorted.
    ///
    /// Unreadable subdirectories are skipped. Only a missing or inaccessible
    /// root is an error.
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let metadata = std::fs::metadata(root)
            .map_err(|_| AuditError::RootNotFound(root.to_path_buf()))?;
        if !metadata.is_dir() {
            return Err(AuditError::NotADirectory(root.to_path_buf()));
        }
        std::fs::read_dir(root).map_err(|_| AuditError::RootNotFound(root.to_path_buf()))?;

        let absolute_root = std::path::absolute(root).map_err(|e| AuditError::read_error(root, e))?;

        let mut walker = WalkDir::new(&absolute_root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();
        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        let files: Vec<PathBuf> = walker
            .into_iter()
            .filter_entry(|e| self.keep_entry(e))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .filter(|e| self.matches_extension(e.path()))
            .map(|e| e.into_path())
            .collect();

        trace!(root = %absolute_root.display(), files = files.len(), "Discovery complete");
        Ok(files)
    }
}
