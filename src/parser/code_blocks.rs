//! Fenced and indented code-block extraction.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Minimum indentation, in columns, of an indented code block line.
pub const INDENT_COLUMNS: usize = 4;

/// How a code segment was delimited in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Fenced,
    Indented,
}

/// One embedded code snippet, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSegment {
    /// Snippet content without delimiters or block indentation.
    pub text: String,
    /// Language tag from the opening fence, if any.
    pub language: Option<String>,
    /// Byte offset of the first content line in the document.
    pub start_offset: usize,
    /// Byte range of the whole block, delimiters included.
    pub block_span: Range<usize>,
    pub kind: BlockKind,
    /// False when a fenced block runs to end of file without a closing fence.
    pub terminated: bool,
}

impl CodeSegment {
    /// A standalone snippet not taken from any document.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        let len = text.len();
        Self {
            text,
            language: None,
            start_offset: 0,
            block_span: 0..len,
            kind: BlockKind::Fenced,
            terminated: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

/// Pulls code segments out of markdown-like text.
pub struct CodeBlockExtractor;

impl CodeBlockExtractor {
    /// Extract every non-empty code segment in document order.
    pub fn extract(text: &str) -> Vec<CodeSegment> {
        Self::extract_all(text)
            .into_iter()
            .filter(|segment| !segment.text.trim().is_empty())
            .collect()
    }

    /// Like `extract`, but keeps whitespace-only segments. Structural
    /// masking needs the spans of empty blocks too.
    pub fn extract_all(text: &str) -> Vec<CodeSegment> {
        let lines = split_lines(text);
        let mut segments = Vec::new();
        let mut in_paragraph = false;
        let mut i = 0;

        while i < lines.len() {
            let (offset, line) = lines[i];

            if let Some((fence, language)) = parse_fence_open(line) {
                let content_start = offset + line.len();
                let close = (i + 1..lines.len()).find(|&j| is_fence_close(lines[j].1, fence));
                let (content_end, block_end, next) = match close {
                    Some(j) => (lines[j].0, lines[j].0 + lines[j].1.len(), j + 1),
                    None => (text.len(), text.len(), lines.len()),
                };

                segments.push(CodeSegment {
                    text: text[content_start..content_end].to_string(),
                    language,
                    start_offset: content_start,
                    block_span: offset..block_end,
                    kind: BlockKind::Fenced,
                    terminated: close.is_some(),
                });
                in_paragraph = false;
                i = next;
                continue;
            }

            // An indented line cannot interrupt a paragraph; it continues it.
            if !in_paragraph && is_indented(line) {
                let mut last = i;
                let mut j = i + 1;
                while j < lines.len() {
                    if is_indented(lines[j].1) {
                        last = j;
                    } else if !lines[j].1.trim().is_empty() {
                        break;
                    }
                    j += 1;
                }

                let body: String = lines[i..=last]
                    .iter()
                    .map(|(_, l)| dedent(l))
                    .collect::<Vec<_>>()
                    .concat();
                let block_end = lines[last].0 + lines[last].1.len();

                segments.push(CodeSegment {
                    text: body,
                    language: None,
                    start_offset: offset,
                    block_span: offset..block_end,
                    kind: BlockKind::Indented,
                    terminated: true,
                });
                in_paragraph = false;
                i = last + 1;
                continue;
            }

            in_paragraph = !line.trim().is_empty() && !is_atx_heading(line);
            i += 1;
        }

        segments
    }
}

/// Lines with their starting byte offsets, line terminators kept.
fn split_lines(text: &str) -> Vec<(usize, &str)> {
    let mut offset = 0;
    text.split_inclusive('\n')
        .map(|line| {
            let start = offset;
            offset += line.len();
            (start, line)
        })
        .collect()
}

fn leading_columns(line: &str) -> usize {
    let mut columns = 0;
    for c in line.chars() {
        match c {
            ' ' => columns += 1,
            '\t' => columns += INDENT_COLUMNS - (columns % INDENT_COLUMNS),
            _ => break,
        }
    }
    columns
}

fn is_indented(line: &str) -> bool {
    !line.trim().is_empty() && leading_columns(line) >= INDENT_COLUMNS
}

fn is_atx_heading(line: &str) -> bool {
    leading_columns(line) < INDENT_COLUMNS && line.trim_start().starts_with('#')
}

fn dedent(line: &str) -> &str {
    let mut columns = 0;
    for (idx, c) in line.char_indices() {
        if columns >= INDENT_COLUMNS {
            return &line[idx..];
        }
        match c {
            ' ' => columns += 1,
            '\t' => columns += INDENT_COLUMNS - (columns % INDENT_COLUMNS),
            _ => return &line[idx..],
        }
    }
    ""
}

fn parse_fence_open(line: &str) -> Option<(Fence, Option<String>)> {
    if leading_columns(line) >= INDENT_COLUMNS {
        return None;
    }
    let trimmed = line.trim_start();
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == marker).count();
    if len < 3 {
        return None;
    }

    let info = trimmed[len..].trim();
    // Backtick fences may not carry backticks in their info string.
    if marker == '`' && info.contains('`') {
        return None;
    }
    let language = info
        .split_whitespace()
        .next()
        .map(|tag| tag.trim_start_matches('{').trim_end_matches('}').to_lowercase())
        .filter(|tag| !tag.is_empty());

    Some((Fence { marker, len }, language))
}

fn is_fence_close(line: &str, fence: Fence) -> bool {
    if leading_columns(line) >= INDENT_COLUMNS {
        return false;
    }
    let trimmed = line.trim();
    let len = trimmed.chars().take_while(|c| *c == fence.marker).count();
    len >= fence.len && trimmed.chars().count() == len
}
