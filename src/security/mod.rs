//! Path safety for externally supplied paths.

mod path_validation;

pub use path_validation::{
    PathGuard, PathSecurityError, SafePath, check_traversal_patterns, get_safe_path,
};
