//! Structural validation of section markers.
//!
//! Documents carry `<role>`, `<activation>` and `<instructions>` sections
//! plus arbitrary other tags. The tokenizer turns text into open/close
//! markers and the validator checks their balance with a stack.

pub mod tokenizer;
pub mod validator;

pub use tokenizer::{TagKind, TagToken, tokenize};
pub use validator::{REQUIRED_SECTIONS, StructureError, StructureReport, StructureValidator};
