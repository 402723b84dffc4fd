use crate::rules::heuristics::is_loopback_url;
use crate::rules::types::{Rule, Severity};
use regex::Regex;

pub fn rules() -> Vec<Rule> {
    vec![
        md_001(),
        md_002(),
        md_003(),
        md_004(),
        md_005(),
        md_006(),
        md_007(),
        md_008(),
    ]
}

fn md_001() -> Rule {
    Rule {
        id: "MD-001",
        severity: Severity::Medium,
        message: "Command runs with elevated privileges",
        pattern: Regex::new(r"(?m)(?:^|[;&|(]\s*)\s*sudo\s+\S").expect("MD-001: invalid regex"),
        skip: None,
        min_match_len: None,
    }
}

fn md_002() -> Rule {
    Rule {
        id: "MD-002",
        severity: Severity::Medium,
        message: "Force push rewrites remote history",
        pattern: Regex::new(r"\bgit\s+push\b[^\n]*(?:--force\b|\s-f\b)")
            .expect("MD-002: invalid regex"),
        skip: None,
        min_match_len: None,
    }
}

fn md_003() -> Rule {
    Rule {
        id: "MD-003",
        severity: Severity::Medium,
        message: "Hard reset discards local changes",
        pattern: Regex::new(r"\bgit\s+reset\s+--hard\b").expect("MD-003: invalid regex"),
        skip: None,
        min_match_len: None,
    }
}

fn md_004() -> Rule {
    Rule {
        id: "MD-004",
        severity: Severity::Medium,
        message: "TLS certificate verification disabled",
        pattern: Regex::new(
            r#"\bcurl\b[^\n]*\s(?:-k|--insecure)\b|NODE_TLS_REJECT_UNAUTHORIZED\s*=\s*["']?0|\bverify\s*=\s*False\b"#,
        )
        .expect("MD-004: invalid regex"),
        skip: None,
        min_match_len: None,
    }
}

fn md_005() -> Rule {
    Rule {
        id: "MD-005",
        severity: Severity::Medium,
        message: "Recursive forced deletion",
        pattern: Regex::new(r"\brm\s+-[a-zA-Z]*(?:rf|fr)[a-zA-Z]*\b").expect("MD-005: invalid regex"),
        skip: None,
        min_match_len: None,
    }
}

fn md_006() -> Rule {
    Rule {
        id: "MD-006",
        severity: Severity::Medium,
        message: "Forced process termination",
        pattern: Regex::new(r"\bkill(?:all)?\s+-(?:9|KILL|SIGKILL)\b").expect("MD-006: invalid regex"),
        skip: None,
        min_match_len: None,
    }
}

fn md_007() -> Rule {
    Rule {
        id: "MD-007",
        severity: Severity::Medium,
        message: "Global package installation",
        pattern: Regex::new(r"\bnpm\s+(?:install|i)\b[^\n]*\s(?:-g|--global)\b")
            .expect("MD-007: invalid regex"),
        skip: None,
        min_match_len: None,
    }
}

fn md_008() -> Rule {
    Rule {
        id: "MD-008",
        severity: Severity::Medium,
        message: "Download over plaintext HTTP",
        pattern: Regex::new(r"\b(?:curl|wget)\b[^\n]*\bhttp://\S+").expect("MD-008: invalid regex"),
        skip: Some(is_loopback_url),
        min_match_len: None,
    }
}
