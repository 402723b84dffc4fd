use crate::rules::heuristics::{DEFAULT_MIN_SECRET_LENGTH, contains_skip_keyword};
use crate::rules::types::{Rule, Severity};
use regex::Regex;

pub fn rules() -> Vec<Rule> {
    vec![
        hi_001(),
        hi_002(),
        hi_003(),
        hi_004(),
        hi_005(),
        hi_006(),
        hi_007(),
        hi_008(),
    ]
}

// Secret rules accept an underscore-joined name prefix (`DB_PASSWORD`,
// `OPENAI_API_KEY`); `\b` alone never fires after `_`.
fn hi_001() -> Rule {
    Rule {
        id: "HI-001",
        severity: Severity::High,
        message: "Hardcoded password detected",
        pattern: Regex::new(r#"(?i)\b(?:\w*_)?(?:password|passwd|pwd)\s*[=:]\s*["'](?P<value>[^"'\n]*)["']"#)
            .expect("HI-001: invalid regex"),
        skip: Some(contains_skip_keyword),
        min_match_len: Some(DEFAULT_MIN_SECRET_LENGTH),
    }
}

fn hi_002() -> Rule {
    Rule {
        id: "HI-002",
        severity: Severity::High,
        message: "Hardcoded API key detected",
        pattern: Regex::new(r#"(?i)\b(?:\w*_)?api[_-]?key\s*[=:]\s*["'](?P<value>[^"'\n]*)["']"#)
            .expect("HI-002: invalid regex"),
        skip: Some(contains_skip_keyword),
        min_match_len: Some(DEFAULT_MIN_SECRET_LENGTH),
    }
}

fn hi_003() -> Rule {
    Rule {
        id: "HI-003",
        severity: Severity::High,
        message: "Hardcoded secret token detected",
        pattern: Regex::new(
            r#"(?i)\b(?:\w*_)?(?:secret|token|access[_-]?token|auth[_-]?token|client[_-]?secret)\s*[=:]\s*["'](?P<value>[^"'\n]*)["']"#,
        )
        .expect("HI-003: invalid regex"),
        skip: Some(contains_skip_keyword),
        min_match_len: Some(DEFAULT_MIN_SECRET_LENGTH),
    }
}

fn hi_004() -> Rule {
    Rule {
        id: "HI-004",
        severity: Severity::High,
        message: "Destructive SQL statement",
        pattern: Regex::new(r"(?i)\b(?:DROP\s+(?:TABLE|DATABASE|SCHEMA)|TRUNCATE\s+TABLE)\b")
            .expect("HI-004: invalid regex"),
        skip: None,
        min_match_len: None,
    }
}

fn hi_005() -> Rule {
    Rule {
        id: "HI-005",
        severity: Severity::High,
        message: "Privileged container execution",
        pattern: Regex::new(r"\bdocker\s+run\b[^\n]*--privileged\b").expect("HI-005: invalid regex"),
        skip: None,
        min_match_len: None,
    }
}

fn hi_006() -> Rule {
    Rule {
        id: "HI-006",
        severity: Severity::High,
        message: "World-writable permissions",
        pattern: Regex::new(r"\bchmod\s+(?:-R\s+)?0?777\b").expect("HI-006: invalid regex"),
        skip: None,
        min_match_len: None,
    }
}

fn hi_007() -> Rule {
    Rule {
        id: "HI-007",
        severity: Severity::High,
        message: "Dynamic evaluation of variable input",
        pattern: Regex::new(r#"\beval\s+["']?\$"#).expect("HI-007: invalid regex"),
        skip: None,
        min_match_len: None,
    }
}

fn hi_008() -> Rule {
    Rule {
        id: "HI-008",
        severity: Severity::High,
        message: "Access to credential files",
        pattern: Regex::new(
            r"(?:~|\$HOME)/\.(?:ssh/id_[a-z0-9]+|aws/credentials|netrc|docker/config\.json)",
        )
        .expect("HI-008: invalid regex"),
        skip: None,
        min_match_len: None,
    }
}
