//! Field extraction for `CommandMetadata`.

use super::types::{Example, Parameter};
use crate::parser::{BlockKind, Document, FrontmatterParser, Section, Sections};
use crate::scoring::{DESCRIPTION_KEYWORDS, EXAMPLES_KEYWORDS, PARAMETERS_KEYWORDS, USAGE_KEYWORDS};
use regex::Regex;
use std::sync::LazyLock;

/// `- name (optional): description`, with the name optionally in backticks
/// or bold.
static PARAMETER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*[-*+]\s+(?:`(?P<code>[^`]+)`|\*\*(?P<bold>[^*]+)\*\*|(?P<bare>[\w.<>\[\]$-]+))(?P<rest>.*)$",
    )
    .expect("parameter regex")
});

static OPTIONAL_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(\s*optional\s*\)").expect("optional regex"));

/// Everything the registry needs from one document, besides category,
/// phase, safety and score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMetadata {
    pub name: String,
    pub description: String,
    pub usage: String,
    pub parameters: Vec<Parameter>,
    pub examples: Vec<Example>,
}

pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn extract(document: &Document) -> ExtractedMetadata {
        let text = document.text();
        let sections = Sections::parse(text, document.segments());
        let frontmatter = FrontmatterParser::parse(text).unwrap_or_default();

        let name = frontmatter
            .name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| sections.title().map(str::to_string))
            .unwrap_or_else(|| file_stem(document.relative_path()));

        let description = frontmatter
            .description
            .filter(|d| !d.trim().is_empty())
            .or_else(|| {
                sections
                    .find(DESCRIPTION_KEYWORDS)
                    .and_then(|s| first_paragraph(document, s.body.clone()))
            })
            .or_else(|| {
                let start = FrontmatterParser::block_len(text);
                first_paragraph(document, start..text.len())
            })
            .unwrap_or_default();

        ExtractedMetadata {
            name: name.trim().to_string(),
            description,
            usage: sections
                .find(USAGE_KEYWORDS)
                .map(|s| usage_text(document, s))
                .unwrap_or_default(),
            parameters: sections
                .find(PARAMETERS_KEYWORDS)
                .map(|s| extract_parameters(document, s))
                .unwrap_or_default(),
            examples: sections
                .find(EXAMPLES_KEYWORDS)
                .map(|s| extract_examples(document, s))
                .unwrap_or_default(),
        }
    }
}

/// Command id: root-relative path without its extension.
pub fn command_id(relative_path: &str) -> String {
    let trimmed = relative_path.trim_start_matches('/');
    let (dir, file) = match trimmed.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, trimmed),
    };
    let stem = match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    };
    match dir {
        Some(dir) => format!("{dir}/{stem}"),
        None => stem.to_string(),
    }
}

fn file_stem(relative_path: &str) -> String {
    let id = command_id(relative_path);
    id.rsplit('/').next().unwrap_or(&id).to_string()
}

fn in_code_block(document: &Document, offset: usize) -> bool {
    document
        .segments()
        .iter()
        .any(|s| s.block_span.contains(&offset))
}

/// Lines of `range` outside code blocks, with their byte offsets.
fn prose_lines(document: &Document, range: std::ops::Range<usize>) -> Vec<(usize, &str)> {
    let text = &document.text()[range.clone()];
    let mut offset = range.start;
    let mut lines = Vec::new();
    for line in text.split_inclusive('\n') {
        if !in_code_block(document, offset) {
            lines.push((offset, line.trim_end_matches(['\n', '\r'])));
        }
        offset += line.len();
    }
    lines
}

fn is_heading(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

fn is_markup(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with('<') || t.starts_with("---") || t.starts_with('|')
}

/// First run of consecutive prose lines, joined with spaces.
fn first_paragraph(document: &Document, range: std::ops::Range<usize>) -> Option<String> {
    let mut paragraph: Vec<&str> = Vec::new();
    for (_, line) in prose_lines(document, range) {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_heading(trimmed) || is_markup(trimmed) {
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }
        paragraph.push(trimmed);
    }
    (!paragraph.is_empty()).then(|| paragraph.join(" "))
}

/// First code block of the usage section, else its trimmed prose.
fn usage_text(document: &Document, section: &Section) -> String {
    document
        .segments()
        .iter()
        .find(|s| section.body.contains(&s.block_span.start))
        .map(|s| s.text.trim_end().to_string())
        .or_else(|| first_paragraph(document, section.body.clone()))
        .unwrap_or_default()
}

pub fn extract_parameters(document: &Document, section: &Section) -> Vec<Parameter> {
    prose_lines(document, section.body.clone())
        .into_iter()
        .filter_map(|(_, line)| parse_parameter(line))
        .collect()
}

fn parse_parameter(line: &str) -> Option<Parameter> {
    let caps = PARAMETER_LINE.captures(line)?;
    let name = caps
        .name("code")
        .or_else(|| caps.name("bold"))
        .or_else(|| caps.name("bare"))?
        .as_str()
        .trim()
        .to_string();
    let rest = caps.name("rest").map_or("", |m| m.as_str());

    let optional = OPTIONAL_MARKER.is_match(rest);
    let stripped = OPTIONAL_MARKER.replace_all(rest, "");
    let description = stripped
        .trim()
        .trim_start_matches([':', '-', '–', '—'])
        .trim()
        .to_string();

    Some(Parameter {
        name,
        optional,
        description,
    })
}

pub fn extract_examples(document: &Document, section: &Section) -> Vec<Example> {
    let mut examples = Vec::new();
    let mut prose_start = section.body.start;

    for segment in document.segments() {
        if segment.kind != BlockKind::Fenced || !section.body.contains(&segment.block_span.start) {
            continue;
        }
        let description = lead_in(document, prose_start..segment.block_span.start)
            .unwrap_or_else(|| format!("Example {}", examples.len() + 1));
        examples.push(Example {
            description,
            language: segment.language.clone(),
            code: segment.text.trim_end().to_string(),
        });
        prose_start = segment.block_span.end.min(section.body.end);
    }

    examples
}

/// Closest non-empty line before a block: prose or a sub-heading.
fn lead_in(document: &Document, range: std::ops::Range<usize>) -> Option<String> {
    prose_lines(document, range)
        .into_iter()
        .rev()
        .map(|(_, line)| line.trim())
        .find(|line| !line.is_empty() && !is_markup(line))
        .map(|line| {
            line.trim_start_matches('#')
                .trim()
                .trim_end_matches(':')
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::from_text("/root/dev/review.md", "development/review.md", text.to_string())
    }

    const DOC: &str = "# Code Review\n\n## Description\n\nReviews the current diff.\nFocuses on risky changes.\n\nSecond paragraph.\n\n## Usage\n\n```bash\n/review [--strict]\n```\n\n## Parameters\n\n- `--strict` (optional): fail on warnings\n- **target**: branch to compare\n- depth - history depth (Optional)\n\n```bash\n- not-a-param: inside code\n```\n\n## Examples\n\nReview against main:\n\n```bash\n/review main\n```\n\n```bash\n/review --strict\n```\n";

    #[test]
    fn test_command_id() {
        assert_eq!(command_id("development/code-review.md"), "development/code-review");
        assert_eq!(command_id("init.md"), "init");
        assert_eq!(command_id("a/b/c.tar.md"), "a/b/c.tar");
        assert_eq!(command_id(".hidden"), ".hidden");
    }

    #[test]
    fn test_name_from_title() {
        let meta = MetadataExtractor::extract(&doc(DOC));
        assert_eq!(meta.name, "Code Review");
    }

    #[test]
    fn test_name_from_frontmatter() {
        let meta = MetadataExtractor::extract(&doc("---\nname: cr\ndescription: Short\n---\n# Code Review\n"));
        assert_eq!(meta.name, "cr");
        assert_eq!(meta.description, "Short");
    }

    #[test]
    fn test_name_falls_back_to_stem() {
        let meta = MetadataExtractor::extract(&doc("no headings here\n"));
        assert_eq!(meta.name, "review");
        assert_eq!(meta.description, "no headings here");
    }

    #[test]
    fn test_description_first_paragraph() {
        let meta = MetadataExtractor::extract(&doc(DOC));
        assert_eq!(meta.description, "Reviews the current diff. Focuses on risky changes.");
    }

    #[test]
    fn test_usage_prefers_code() {
        let meta = MetadataExtractor::extract(&doc(DOC));
        assert_eq!(meta.usage, "/review [--strict]");
    }

    #[test]
    fn test_parameters() {
        let meta = MetadataExtractor::extract(&doc(DOC));
        assert_eq!(meta.parameters.len(), 3);
        assert_eq!(meta.parameters[0].name, "--strict");
        assert!(meta.parameters[0].optional);
        assert_eq!(meta.parameters[0].description, "fail on warnings");
        assert_eq!(meta.parameters[1].name, "target");
        assert!(!meta.parameters[1].optional);
        assert_eq!(meta.parameters[1].description, "branch to compare");
        assert_eq!(meta.parameters[2].name, "depth");
        assert!(meta.parameters[2].optional);
        assert_eq!(meta.parameters[2].description, "history depth");
    }

    #[test]
    fn test_examples() {
        let meta = MetadataExtractor::extract(&doc(DOC));
        assert_eq!(meta.examples.len(), 2);
        assert_eq!(meta.examples[0].description, "Review against main");
        assert_eq!(meta.examples[0].code, "/review main");
        assert_eq!(meta.examples[0].language.as_deref(), Some("bash"));
        assert_eq!(meta.examples[1].description, "Example 2");
    }

    #[test]
    fn test_example_subheading_lead_in() {
        let text = "# T\n\n## Examples\n\n### Staging\n\n```sh\ndeploy staging\n```\n";
        let meta = MetadataExtractor::extract(&doc(text));
        assert_eq!(meta.examples[0].description, "Staging");
    }

    #[test]
    fn test_missing_sections_yield_empty() {
        let meta = MetadataExtractor::extract(&doc("# Bare\n"));
        assert!(meta.parameters.is_empty());
        assert!(meta.examples.is_empty());
        assert!(meta.usage.is_empty());
    }
}
