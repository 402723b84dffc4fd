//! Match filters and display helpers for the pattern engine.

/// Default minimum literal length for secret-style matches.
pub const DEFAULT_MIN_SECRET_LENGTH: usize = 8;

/// Longest match text shown in a finding.
pub const MAX_MATCH_DISPLAY: usize = 60;

const ELLIPSIS: &str = "...";

/// Keywords marking a secret-looking literal as a placeholder. Checked
/// case-insensitively against the whole matched text.
pub const SKIP_KEYWORDS: &[&str] = &["example", "placeholder", "your-", "replace_with"];

/// True when the matched text contains any placeholder keyword.
///
/// The check is all-or-nothing: one keyword anywhere in the match voids it,
/// so a literal like `my-example-password-for-prod` is not reported.
pub fn contains_skip_keyword(matched: &str) -> bool {
    let lower = matched.to_lowercase();
    SKIP_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Loopback URLs are not plaintext downloads from the network.
pub fn is_loopback_url(matched: &str) -> bool {
    matched.contains("http://localhost") || matched.contains("http://127.0.0.1")
}

/// Single-line display form of a match, cut to fit `MAX_MATCH_DISPLAY` and
/// terminated with an ellipsis when cut.
pub fn truncate_match(matched: &str) -> String {
    let flat: String = matched
        .trim()
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    if flat.chars().count() <= MAX_MATCH_DISPLAY {
        return flat;
    }

    let keep = MAX_MATCH_DISPLAY - ELLIPSIS.len() - 1;
    let mut out: String = flat.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
