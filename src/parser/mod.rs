//! Content parsing layer.
//!
//! Turns raw document text into the pieces the validators work on:
//! - `CodeBlockExtractor`: fenced and indented code segments
//! - `Sections`: markdown heading sections
//! - `FrontmatterParser`: leading YAML block
//! - `Document`: a loaded file with its segments

pub mod code_blocks;
pub mod document;
pub mod frontmatter;
pub mod sections;

pub use code_blocks::{BlockKind, CodeBlockExtractor, CodeSegment};
pub use document::Document;
pub use frontmatter::{Frontmatter, FrontmatterParser};
pub use sections::{Section, Sections};
