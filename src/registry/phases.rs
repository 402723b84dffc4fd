//! Category and phase inference from document paths.

use crate::config::CategoryMapping;

pub const FALLBACK_CATEGORY: &str = "general";
pub const FALLBACK_PHASE: u32 = 0;

/// Builtin rows, checked in order. The trailing empty prefix is the
/// catch-all.
const BUILTIN: &[(&str, &str, u32, &str)] = &[
    ("setup", "setup", 1, "Project and environment setup"),
    ("planning", "planning", 2, "Planning and design"),
    ("development", "development", 3, "Day-to-day development"),
    ("testing", "testing", 4, "Testing and verification"),
    ("security", "security", 5, "Security review and hardening"),
    ("deployment", "deployment", 6, "Release and deployment"),
    ("documentation", "documentation", 7, "Documentation upkeep"),
    ("maintenance", "maintenance", 8, "Maintenance and cleanup"),
    ("", FALLBACK_CATEGORY, FALLBACK_PHASE, "Uncategorized commands"),
];

/// Ordered path-prefix table. The first row whose prefix matches the
/// root-relative path wins.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    rows: Vec<CategoryMapping>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CategoryTable {
    pub fn builtin() -> Self {
        let rows = BUILTIN
            .iter()
            .map(|(prefix, category, phase, description)| CategoryMapping {
                prefix: (*prefix).to_string(),
                category: (*category).to_string(),
                phase: *phase,
                description: (*description).to_string(),
            })
            .collect();
        Self { rows }
    }

    /// Use `rows` in place of the builtin table; an empty list keeps the
    /// builtin one. A catch-all row is appended when `rows` has none.
    pub fn from_mappings(rows: &[CategoryMapping]) -> Self {
        if rows.is_empty() {
            return Self::builtin();
        }
        let mut rows = rows.to_vec();
        if !rows.iter().any(|r| normalize_prefix(&r.prefix).is_empty()) {
            rows.push(CategoryMapping {
                prefix: String::new(),
                category: FALLBACK_CATEGORY.to_string(),
                phase: FALLBACK_PHASE,
                description: "Uncategorized commands".to_string(),
            });
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[CategoryMapping] {
        &self.rows
    }

    /// Row for a root-relative path with `/` separators.
    pub fn resolve(&self, relative_path: &str) -> &CategoryMapping {
        self.rows
            .iter()
            .find(|row| prefix_matches(&row.prefix, relative_path))
            .unwrap_or_else(|| {
                // from_mappings guarantees a catch-all row
                &self.rows[self.rows.len() - 1]
            })
    }

    /// Row describing `category`, if the table knows it.
    pub fn category(&self, category: &str) -> Option<&CategoryMapping> {
        self.rows.iter().find(|r| r.category == category)
    }
}

fn normalize_prefix(prefix: &str) -> &str {
    prefix.trim_matches('/')
}

/// Whole path segments only: `setup` matches `setup/init.md` but not
/// `setup-tools/init.md`.
fn prefix_matches(prefix: &str, relative_path: &str) -> bool {
    let prefix = normalize_prefix(prefix);
    if prefix.is_empty() {
        return true;
    }
    relative_path == prefix
        || relative_path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}
