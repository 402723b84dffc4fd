mod critical;
mod high;
mod medium;

use crate::rules::types::{Rule, Severity};
use std::sync::LazyLock;

/// All builtin rules, ordered critical tier first, then high, then medium.
static ALL_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    let mut rules = Vec::with_capacity(25);
    rules.extend(critical::rules());
    rules.extend(high::rules());
    rules.extend(medium::rules());
    rules
});

pub fn all_rules() -> &'static [Rule] {
    &ALL_RULES
}

/// Rules of a single tier, in declaration order.
pub fn tier(severity: Severity) -> impl Iterator<Item = &'static Rule> {
    all_rules().iter().filter(move |r| r.severity == severity)
}
