//! ReDoS (Regular Expression Denial of Service) tests.
//!
//! The rule set runs over untrusted document content. The regex crate
//! guarantees linear-time matching, and these tests keep it that way if a
//! rule ever moves to a backtracking engine.

use cmd_audit::{CodeSegment, RuleEngine};
use std::time::{Duration, Instant};

/// Maximum acceptable time for one full rule-set scan.
/// Generous enough for loaded CI machines while still catching real ReDoS.
const MAX_ACCEPTABLE_TIME: Duration = Duration::from_millis(500);

fn assert_scan_is_fast(input: String) {
    let engine = RuleEngine::new();
    let segment = CodeSegment::plain(input);

    let start = Instant::now();
    let _findings = engine.scan_segments(std::slice::from_ref(&segment), "redos.md");
    let elapsed = start.elapsed();

    assert!(
        elapsed < MAX_ACCEPTABLE_TIME,
        "ReDoS detected: took {:?}, expected < {:?}",
        elapsed,
        MAX_ACCEPTABLE_TIME
    );
}

#[test]
fn test_redos_curl_with_many_spaces() {
    // Pattern: (curl|wget) [^\n|]* | sh
    assert_scan_is_fast(format!("curl {}", "a ".repeat(10000)));
}

#[test]
fn test_redos_rm_with_many_flags() {
    // Pattern: rm (-\w+ )+ /
    assert_scan_is_fast(format!("rm {}x", "-r ".repeat(10000)));
}

#[test]
fn test_redos_unterminated_password_quote() {
    // Pattern: password = "[^"'\n]*"
    assert_scan_is_fast(format!("password=\"{}", "a".repeat(50000)));
}

#[test]
fn test_redos_repeated_assignments() {
    assert_scan_is_fast("api_key=".repeat(10000));
}

#[test]
fn test_redos_fork_bomb_fragments() {
    // Pattern: :\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}
    assert_scan_is_fast(format!(":() {{ {}", ": | ".repeat(10000)));
}

#[test]
fn test_redos_sudo_after_separators() {
    assert_scan_is_fast(format!("{}sudo", "; ".repeat(20000)));
}

#[test]
fn test_redos_long_single_line() {
    assert_scan_is_fast(format!("git push {} origin", "x".repeat(100000)));
}

#[test]
fn test_redos_many_lines() {
    assert_scan_is_fast("wget http://\n".repeat(10000));
}
