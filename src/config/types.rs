//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::error::ConfigError;

/// Main configuration structure for cmd-audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File discovery settings.
    pub discovery: DiscoveryConfig,
    /// Security pattern engine settings.
    pub security: SecurityConfig,
    /// Optional sandboxed verification of risky commands.
    pub sandbox: SandboxConfig,
    /// Registry output settings.
    pub registry: RegistryConfig,
    /// Allow-list consulted by the path guard.
    pub paths: PathsConfig,
    /// Category/phase table override. Empty means the builtin table.
    pub categories: Vec<CategoryMapping>,
}

impl Config {
    /// Reject values that would make a run meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.discovery.extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "discovery.extensions must not be empty".to_string(),
            ));
        }
        if self.sandbox.max_concurrent == 0 {
            return Err(ConfigError::Invalid(
                "sandbox.max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.sandbox.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "sandbox.timeout_secs must be at least 1".to_string(),
            ));
        }
        if let Some(dup) = self.categories.iter().enumerate().find_map(|(i, m)| {
            self.categories[..i]
                .iter()
                .find(|prev| prev.category == m.category && prev.phase != m.phase)
                .map(|_| m.category.clone())
        }) {
            return Err(ConfigError::Invalid(format!(
                "category '{}' is mapped to more than one phase",
                dup
            )));
        }
        Ok(())
    }
}

/// Discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// File extensions to include, without the leading dot.
    pub extensions: Vec<String>,
    /// Case-sensitive substrings matched against the normalized absolute path.
    pub exclude: Vec<String>,
    /// Whether to follow symbolic links while walking.
    pub follow_symlinks: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["md".to_string()],
            exclude: vec![
                "/.git/".to_string(),
                "/node_modules/".to_string(),
                "/target/".to_string(),
            ],
            follow_symlinks: false,
        }
    }
}

/// Security pattern engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Minimum literal length for a secret-style match to count.
    pub min_secret_length: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            min_secret_length: crate::rules::DEFAULT_MIN_SECRET_LENGTH,
        }
    }
}

/// Sandboxed verifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Run caution/dangerous snippets in an isolated container.
    pub enabled: bool,
    /// Container runtime binary.
    pub runtime: String,
    /// Image the snippets run in.
    pub image: String,
    /// Wall-clock limit per run.
    pub timeout_secs: u64,
    /// Maximum number of containers alive at once.
    pub max_concurrent: usize,
    /// Memory limit passed to the runtime.
    pub memory: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            runtime: "docker".to_string(),
            image: "alpine:3.20".to_string(),
            timeout_secs: 30,
            max_concurrent: 2,
            memory: "256m".to_string(),
        }
    }
}

/// Registry persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Output path, relative to the project root.
    pub output: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(".cmd-audit").join("registry.json"),
        }
    }
}

/// Allow-list for paths supplied from outside the trust boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Individual files directly under the root.
    pub allowed_files: Vec<String>,
    /// Directory prefixes under the root.
    pub allowed_dirs: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            allowed_files: vec!["README.md".to_string(), "CLAUDE.md".to_string()],
            allowed_dirs: vec![
                "docs".to_string(),
                "commands".to_string(),
                ".claude".to_string(),
            ],
        }
    }
}

/// One row of the category/phase inference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMapping {
    /// Root-relative path prefix. The empty prefix matches everything.
    pub prefix: String,
    pub category: String,
    pub phase: u32,
    #[serde(default)]
    pub description: String,
}
