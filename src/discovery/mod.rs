//! Discovery layer for document enumeration.
//!
//! Walks a root directory recursively, keeps files with a target extension
//! and drops anything whose normalized absolute path contains an exclusion
//! substring.

pub mod walker;

pub use walker::{DirectoryWalker, WalkConfig, normalize_path};
