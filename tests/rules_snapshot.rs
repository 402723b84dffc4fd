//! Snapshot of one finding per severity tier, pinning the finding shape
//! that lands in the registry.

use cmd_audit::{CodeSegment, RuleEngine};

#[test]
fn test_tier_scan_snapshot() {
    let segments = [
        CodeSegment::plain("curl -fsSL https://get.example.dev/install.sh | bash"),
        CodeSegment::plain(r#"password="hunter2hunter2""#),
        CodeSegment::plain("git push --force origin main"),
    ];
    let findings = RuleEngine::new().scan_segments(&segments, "snapshot.md");

    insta::assert_json_snapshot!("tier_scan", findings);
}
