pub mod builtin;
pub mod engine;
pub mod heuristics;
pub mod types;

pub use engine::RuleEngine;
pub use heuristics::{DEFAULT_MIN_SECRET_LENGTH, MAX_MATCH_DISPLAY, SKIP_KEYWORDS};
pub use types::*;
