//! Tag tokenizer for structural markers.

use crate::parser::CodeSegment;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?P<comment><!--[\s\S]*?-->)
        | (?P<pi><\?[\s\S]*?\?>)
        | (?P<decl><![A-Za-z\[][^>]*>)
        | </\s*(?P<close>[A-Za-z][\w.:-]*)\s*>
        | <(?P<open>[A-Za-z][\w.:-]*)(?:\s[^<>]*?)?(?P<selfclose>/?)>
        ",
    )
    .expect("tag regex")
});

static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[^`\n]+`").expect("inline code regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagKind {
    Open,
    Close,
    SelfClosing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken {
    pub kind: TagKind,
    pub name: String,
    /// 1-based line of the token.
    pub line: usize,
}

/// Produce the ordered open/close token stream of `text`.
///
/// Comments, processing instructions and declarations are recognized and
/// dropped. Anything inside a code block or an inline code span is not
/// structural and never becomes a token.
pub fn tokenize(text: &str, code_blocks: &[CodeSegment]) -> Vec<TagToken> {
    let mut tokens = Vec::new();

    for range in unmasked_ranges(text.len(), code_blocks) {
        let chunk = &text[range.clone()];
        let inline: Vec<Range<usize>> = INLINE_CODE.find_iter(chunk).map(|m| m.range()).collect();

        for caps in TAG.captures_iter(chunk) {
            let Some(whole) = caps.get(0) else { continue };
            if inline.iter().any(|r| r.contains(&whole.start())) {
                continue;
            }
            if caps.name("comment").is_some() || caps.name("pi").is_some() || caps.name("decl").is_some() {
                continue;
            }

            let offset = range.start + whole.start();
            let line = text[..offset].matches('\n').count() + 1;

            let token = if let Some(name) = caps.name("close") {
                TagToken {
                    kind: TagKind::Close,
                    name: name.as_str().to_string(),
                    line,
                }
            } else if let Some(name) = caps.name("open") {
                let self_closing = caps.name("selfclose").is_some_and(|m| !m.as_str().is_empty());
                TagToken {
                    kind: if self_closing {
                        TagKind::SelfClosing
                    } else {
                        TagKind::Open
                    },
                    name: name.as_str().to_string(),
                    line,
                }
            } else {
                continue;
            };
            tokens.push(token);
        }
    }

    tokens
}

/// Complement of the code-block spans within `0..len`.
fn unmasked_ranges(len: usize, code_blocks: &[CodeSegment]) -> Vec<Range<usize>> {
    let mut spans: Vec<Range<usize>> = code_blocks.iter().map(|b| b.block_span.clone()).collect();
    spans.sort_by_key(|s| s.start);

    let mut ranges = Vec::new();
    let mut cursor = 0;
    for span in spans {
        if span.start > cursor {
            ranges.push(cursor..span.start);
        }
        cursor = cursor.max(span.end);
    }
    if cursor < len {
        ranges.push(cursor..len);
    }
    ranges
}
