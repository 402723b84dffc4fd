use crate::parser::{Document, Sections};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Quality checklist weights
const BASELINE: i32 = 30;
const DESCRIPTION_WEIGHT: i32 = 20;
const USAGE_WEIGHT: i32 = 20;
const PARAMETERS_WEIGHT: i32 = 15;
const EXAMPLES_WEIGHT: i32 = 15;
const HYGIENE_PENALTY: i32 = 5;
const SECURITY_BONUS: i32 = 5;
const MAX_SCORE: i32 = 100;

/// Scores below this are reported as a warning.
pub const LOW_QUALITY_THRESHOLD: u8 = 50;

pub const DESCRIPTION_KEYWORDS: &[&str] = &["description", "overview", "purpose"];
pub const USAGE_KEYWORDS: &[&str] = &["usage", "how to use"];
pub const PARAMETERS_KEYWORDS: &[&str] = &["parameters", "arguments", "options"];
pub const EXAMPLES_KEYWORDS: &[&str] = &["example"];

pub const HYGIENE_MARKERS: &[&str] = &["TODO", "FIXME", "XXX", "HACK"];

static HYGIENE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(TODO|FIXME|XXX|HACK)\b").expect("hygiene regex"));

static SECURITY_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:security|safety)\b").expect("security regex"));

/// Checklist outcome for one document. The score is derived from the other
/// fields and can be recomputed from the document text alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    pub score: u8,
    pub has_description: bool,
    pub has_usage: bool,
    pub usage_has_code: bool,
    pub has_parameters: bool,
    pub has_examples: bool,
    /// Occurrences per hygiene marker; markers with zero hits are omitted.
    pub hygiene: BTreeMap<String, usize>,
    pub mentions_security: bool,
}

impl QualityReport {
    pub fn hygiene_total(&self) -> usize {
        self.hygiene.values().sum()
    }

    /// Names of optional sections the document lacks.
    pub fn missing_sections(&self) -> Vec<&'static str> {
        [
            (self.has_description, "Description"),
            (self.has_usage, "Usage"),
            (self.has_parameters, "Parameters"),
            (self.has_examples, "Examples"),
        ]
        .into_iter()
        .filter(|(present, _)| !present)
        .map(|(_, name)| name)
        .collect()
    }

    fn compute_score(&self) -> u8 {
        let mut score = BASELINE;
        if self.has_description {
            score += DESCRIPTION_WEIGHT;
        }
        if self.has_usage && self.usage_has_code {
            score += USAGE_WEIGHT;
        }
        if self.has_parameters {
            score += PARAMETERS_WEIGHT;
        }
        if self.has_examples {
            score += EXAMPLES_WEIGHT;
        }
        score -= HYGIENE_PENALTY * i32::try_from(self.hygiene_total()).unwrap_or(i32::MAX / HYGIENE_PENALTY);
        if self.mentions_security {
            score += SECURITY_BONUS;
        }
        // Clamped to 0..=100, so the cast is lossless
        score.clamp(0, MAX_SCORE) as u8
    }
}

/// Weighted checklist scorer for section completeness and hygiene.
pub struct QualityScorer;

impl QualityScorer {
    pub fn score(document: &Document) -> QualityReport {
        let text = document.text();
        let sections = Sections::parse(text, document.segments());

        let usage = sections.find(USAGE_KEYWORDS);
        let usage_has_code = usage.is_some_and(|section| {
            document
                .segments()
                .iter()
                .any(|segment| section.body.contains(&segment.block_span.start))
        });

        let mut hygiene = BTreeMap::new();
        for caps in HYGIENE.captures_iter(text) {
            *hygiene.entry(caps[1].to_string()).or_insert(0) += 1;
        }

        let mut report = QualityReport {
            score: 0,
            has_description: sections.find(DESCRIPTION_KEYWORDS).is_some(),
            has_usage: usage.is_some(),
            usage_has_code,
            has_parameters: sections.find(PARAMETERS_KEYWORDS).is_some(),
            has_examples: sections.find(EXAMPLES_KEYWORDS).is_some(),
            hygiene,
            mentions_security: SECURITY_MENTION.is_match(text),
        };
        report.score = report.compute_score();
        report
    }
}
