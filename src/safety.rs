use crate::rules::{Finding, Severity};
use serde::{Deserialize, Serialize};

/// Ternary document classification, ordered safe < caution < dangerous.
///
/// A level is always derived from findings and never stored on its own, so
/// it can be recomputed from a registry's security issues at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyLevel {
    #[default]
    Safe,
    Caution,
    Dangerous,
}

impl SafetyLevel {
    pub fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Critical | Severity::High => SafetyLevel::Dangerous,
            Severity::Medium => SafetyLevel::Caution,
        }
    }

    /// Highest level over all findings; `Safe` when there are none.
    pub fn from_findings<'a>(findings: impl IntoIterator<Item = &'a Finding>) -> Self {
        findings
            .into_iter()
            .map(|f| Self::from_severity(f.severity))
            .max()
            .unwrap_or_default()
    }

    /// Caution and dangerous documents are candidates for sandbox runs.
    pub fn is_risky(&self) -> bool {
        *self > SafetyLevel::Safe
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyLevel::Safe => "safe",
            SafetyLevel::Caution => "caution",
            SafetyLevel::Dangerous => "dangerous",
        }
    }
}

impl std::fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleEngine;

    fn finding(severity: Severity) -> Finding {
        Finding {
            rule_id: "T-001".to_string(),
            source_file: "a.md".to_string(),
            severity,
            message: "m".to_string(),
            matched: "x".to_string(),
            segment: 0,
        }
    }

    #[test]
    fn test_no_findings_is_safe() {
        assert_eq!(SafetyLevel::from_findings(&[]), SafetyLevel::Safe);
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(SafetyLevel::from_severity(Severity::Critical), SafetyLevel::Dangerous);
        assert_eq!(SafetyLevel::from_severity(Severity::High), SafetyLevel::Dangerous);
        assert_eq!(SafetyLevel::from_severity(Severity::Medium), SafetyLevel::Caution);
    }

    #[test]
    fn test_dangerous_dominates() {
        let mut findings = vec![finding(Severity::Medium); 10];
        findings.push(finding(Severity::Critical));
        assert_eq!(SafetyLevel::from_findings(&findings), SafetyLevel::Dangerous);
    }

    #[test]
    fn test_critical_and_medium_scan_is_dangerous() {
        let findings = RuleEngine::new().check_content(
            "git reset --hard\ncurl -sL https://get.tool.sh | bash",
            "doc.md",
        );
        assert_eq!(findings.len(), 2);
        assert_eq!(SafetyLevel::from_findings(&findings), SafetyLevel::Dangerous);
    }

    #[test]
    fn test_medium_only_is_caution() {
        let findings = RuleEngine::new().check_content("kill -9 1234", "doc.md");
        assert_eq!(SafetyLevel::from_findings(&findings), SafetyLevel::Caution);
    }

    #[test]
    fn test_ordering_and_risky() {
        assert!(SafetyLevel::Dangerous > SafetyLevel::Caution);
        assert!(SafetyLevel::Caution > SafetyLevel::Safe);
        assert!(!SafetyLevel::Safe.is_risky());
        assert!(SafetyLevel::Caution.is_risky());
    }

    #[test]
    fn test_serialization() {
        assert_eq!(serde_json::to_string(&SafetyLevel::Caution).unwrap(), "\"caution\"");
    }
}
