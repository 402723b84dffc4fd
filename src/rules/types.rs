use serde::{Deserialize, Serialize};

/// Rule severity. Tiers form a total order: critical > high > medium, and
/// any severity outranks "no finding" (`None` in an `Option<Severity>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::High, Severity::Medium];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Returns true when a raw match should be discarded.
pub type SkipPredicate = fn(&str) -> bool;

/// A declarative detection rule. Rules are built once and never mutated.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: &'static str,
    pub severity: Severity,
    pub message: &'static str,
    /// Matcher. A `value` capture group, when present, is the literal whose
    /// length is checked against `min_match_len`.
    pub pattern: regex::Regex,
    pub skip: Option<SkipPredicate>,
    /// Secret-style rules set this floor; the engine's configured minimum
    /// can raise it.
    pub min_match_len: Option<usize>,
}

impl Rule {
    /// Secret-style rules carry a minimum literal length.
    pub fn is_secret(&self) -> bool {
        self.min_match_len.is_some()
    }
}

/// One rule match that survived all filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub source_file: String,
    pub severity: Severity,
    pub message: String,
    /// Display text of the match, at most `MAX_MATCH_DISPLAY` characters.
    #[serde(rename = "match")]
    pub matched: String,
    /// Zero-based index of the code segment the match came from.
    pub segment: usize,
}

impl Finding {
    pub fn new(rule: &Rule, source_file: &str, segment: usize, matched: String) -> Self {
        Self {
            rule_id: rule.id.to_string(),
            source_file: source_file.to_string(),
            severity: rule.severity,
            message: rule.message.to_string(),
            matched,
            segment,
        }
    }
}

/// Per-severity counts over a list of findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
}

impl Summary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        findings
            .iter()
            .fold(Self::default(), |mut acc, f| {
                match f.severity {
                    Severity::Critical => acc.critical += 1,
                    Severity::High => acc.high += 1,
                    Severity::Medium => acc.medium += 1,
                }
                acc
            })
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium
    }
}
