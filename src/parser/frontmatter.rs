//! YAML frontmatter parser for command documents.

use serde::Deserialize;

/// Fields of interest in a document's frontmatter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Frontmatter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Parses YAML frontmatter from markdown files.
pub struct FrontmatterParser;

impl FrontmatterParser {
    /// Extract frontmatter content from a document.
    ///
    /// Frontmatter is delimited by `---` lines at the very start of the file.
    /// Returns None if no valid frontmatter is found.
    ///
    /// # Example
    /// ```
    /// use cmd_audit::parser::FrontmatterParser;
    /// let content = "---\nname: test\n---\n# Content";
    /// let frontmatter = FrontmatterParser::extract(content);
    /// assert_eq!(frontmatter, Some("name: test\n"));
    /// ```
    pub fn extract(content: &str) -> Option<&str> {
        let rest = content
            .strip_prefix("---\n")
            .or_else(|| content.strip_prefix("---\r\n"))?;

        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if line.trim_end() == "---" {
                return Some(&rest[..offset]);
            }
            offset += line.len();
        }
        None
    }

    /// Byte length of the frontmatter block, delimiters included.
    pub fn block_len(content: &str) -> usize {
        let Some(body) = Self::extract(content) else {
            return 0;
        };
        let opening = if content.starts_with("---\r\n") { 5 } else { 4 };
        let after = &content[opening + body.len()..];
        let closing = after.split_inclusive('\n').next().map_or(0, str::len);
        opening + body.len() + closing
    }

    /// Parse the `name`/`description` fields.
    ///
    /// Returns None if no frontmatter exists or parsing fails.
    pub fn parse(content: &str) -> Option<Frontmatter> {
        Self::extract(content).and_then(|fm| serde_yaml::from_str(fm).ok())
    }
}
