use crate::parser::{CodeSegment, Document};
use crate::rules::builtin;
use crate::rules::heuristics::{DEFAULT_MIN_SECRET_LENGTH, truncate_match};
use crate::rules::types::{Finding, Rule};
use rustc_hash::FxHashSet;
use tracing::trace;

/// Applies every builtin rule to every code segment of a document.
///
/// The engine holds no per-scan state: the compiled patterns are shared and
/// read-only, and each scan builds its own dedup set, so one engine can be
/// used from many threads and repeated calls return identical output.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: &'static [Rule],
    min_secret_length: usize,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    pub fn new() -> Self {
        Self {
            rules: builtin::all_rules(),
            min_secret_length: DEFAULT_MIN_SECRET_LENGTH,
        }
    }

    /// Minimum literal length for secret-style rules. Raises, never lowers,
    /// a rule's own `min_match_len`.
    pub fn with_min_secret_length(mut self, len: usize) -> Self {
        self.min_secret_length = len;
        self
    }

    pub fn min_secret_length(&self) -> usize {
        self.min_secret_length
    }

    /// Get a rule by ID
    pub fn get_rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn rules(&self) -> &[Rule] {
        self.rules
    }

    pub fn scan_document(&self, document: &Document) -> Vec<Finding> {
        self.scan_segments(document.segments(), &document.display_path())
    }

    /// Findings for all segments, ordered by segment index, then rule order,
    /// then match start.
    pub fn scan_segments(&self, segments: &[CodeSegment], source_file: &str) -> Vec<Finding> {
        trace!(
            file = source_file,
            segments = segments.len(),
            rules = self.rules.len(),
            "Scanning code segments"
        );

        let mut seen: FxHashSet<(usize, usize, usize, usize)> = FxHashSet::default();
        let mut findings = Vec::new();

        for (segment_idx, segment) in segments.iter().enumerate() {
            for (rule_idx, rule) in self.rules.iter().enumerate() {
                for caps in rule.pattern.captures_iter(&segment.text) {
                    let Some(whole) = caps.get(0) else {
                        continue;
                    };

                    if !self.passes_filters(rule, whole.as_str(), caps.name("value").map(|m| m.as_str())) {
                        trace!(rule = rule.id, segment = segment_idx, "Match discarded by filter");
                        continue;
                    }

                    if !seen.insert((rule_idx, segment_idx, whole.start(), whole.end())) {
                        continue;
                    }

                    findings.push(Finding::new(
                        rule,
                        source_file,
                        segment_idx,
                        truncate_match(whole.as_str()),
                    ));
                }
            }
        }

        findings
    }

    /// Convenience for scanning a single free-standing snippet.
    pub fn check_content(&self, content: &str, source_file: &str) -> Vec<Finding> {
        let segment = CodeSegment::plain(content);
        self.scan_segments(std::slice::from_ref(&segment), source_file)
    }

    /// The rule's own floor, raised to the configured minimum. `None` for
    /// rules without a length check.
    pub fn min_length_for(&self, rule: &Rule) -> Option<usize> {
        rule.min_match_len.map(|floor| floor.max(self.min_secret_length))
    }

    fn passes_filters(&self, rule: &Rule, matched: &str, value: Option<&str>) -> bool {
        if let Some(min) = self.min_length_for(rule) {
            let literal = value.unwrap_or(matched);
            if literal.chars().count() < min {
                return false;
            }
        }

        match rule.skip {
            Some(skip) => !skip(matched),
            None => true,
        }
    }
}
