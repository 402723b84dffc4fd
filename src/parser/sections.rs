//! Markdown heading sections.

use super::code_blocks::CodeSegment;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(#{1,6})[ \t]+(.*?)[ \t#]*$").expect("heading regex"));

/// A heading and the text it governs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub level: usize,
    pub title: String,
    /// Byte offset of the heading line.
    pub heading_offset: usize,
    /// Body range: after the heading line up to the next heading of the
    /// same or a higher level.
    pub body: Range<usize>,
}

impl Section {
    pub fn body_text<'a>(&self, text: &'a str) -> &'a str {
        &text[self.body.clone()]
    }

    /// Case-insensitive title match on a keyword prefix, ignoring a
    /// trailing colon.
    pub fn matches(&self, keyword: &str) -> bool {
        let title = self.title.trim().trim_end_matches(':').to_lowercase();
        title.starts_with(keyword)
    }
}

/// All headings of a document, in order.
#[derive(Debug, Clone, Default)]
pub struct Sections {
    sections: Vec<Section>,
}

impl Sections {
    /// Parse headings, skipping lines that fall inside code blocks.
    pub fn parse(text: &str, code_blocks: &[CodeSegment]) -> Self {
        let mut headings: Vec<(usize, usize, String, usize)> = Vec::new();
        let mut offset = 0;

        for line in text.split_inclusive('\n') {
            let start = offset;
            offset += line.len();

            if code_blocks.iter().any(|b| b.block_span.contains(&start)) {
                continue;
            }
            let content = line.trim_end_matches(['\n', '\r']);
            if let Some(caps) = HEADING.captures(content) {
                let level = caps[1].len();
                let title = caps[2].trim().to_string();
                headings.push((start, level, title, offset));
            }
        }

        let sections = headings
            .iter()
            .enumerate()
            .map(|(idx, (start, level, title, body_start))| {
                let end = headings[idx + 1..]
                    .iter()
                    .find(|(_, next_level, _, _)| next_level <= level)
                    .map(|(next_start, _, _, _)| *next_start)
                    .unwrap_or(text.len());
                Section {
                    level: *level,
                    title: title.clone(),
                    heading_offset: *start,
                    body: *body_start..end,
                }
            })
            .collect();

        Self { sections }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// First section whose title starts with any of `keywords`.
    pub fn find(&self, keywords: &[&str]) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| keywords.iter().any(|k| s.matches(k)))
    }

    /// First top-level (`#`) heading title.
    pub fn title(&self) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.level == 1)
            .map(|s| s.title.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CodeBlockExtractor;

    const DOC: &str = "# Deploy\n\nIntro.\n\n## Usage\n\n```bash\n# not a heading\n/deploy\n```\n\n### Notes\n\nsub\n\n## Parameters:\n\n- `env`: target\n";

    fn parse(text: &str) -> Sections {
        Sections::parse(text, &CodeBlockExtractor::extract_all(text))
    }

    #[test]
    fn test_headings_inside_code_are_ignored() {
        let sections = parse(DOC);
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Deploy", "Usage", "Notes", "Parameters:"]);
    }

    #[test]
    fn test_section_body_includes_subsections() {
        let sections = parse(DOC);
        let usage = sections.find(&["usage"]).unwrap();
        let body = usage.body_text(DOC);
        assert!(body.contains("/deploy"));
        assert!(body.contains("### Notes"));
        assert!(!body.contains("Parameters"));
    }

    #[test]
    fn test_find_ignores_case_and_colon() {
        let sections = parse(DOC);
        let params = sections.find(&["parameters", "arguments"]).unwrap();
        assert!(params.body_text(DOC).contains("`env`"));
        assert!(sections.find(&["examples"]).is_none());
    }

    #[test]
    fn test_title_is_first_h1() {
        assert_eq!(parse(DOC).title(), Some("Deploy"));
        assert_eq!(parse("## Only h2\n").title(), None);
    }

    #[test]
    fn test_closing_hashes_are_trimmed() {
        let sections = parse("## Examples ##\nbody\n");
        assert_eq!(sections.iter().next().unwrap().title, "Examples");
    }
}
