//! Configuration layer for cmd-audit.
//!
//! ## Layers
//! - `types`: Configuration type definitions
//! - `loading`: File loading logic
//! - `error`: Load and validation errors

mod error;
mod loading;
mod types;

pub use error::ConfigError;
pub use loading::CONFIG_FILE_NAMES;
pub use types::{
    CategoryMapping, Config, DiscoveryConfig, PathsConfig, RegistryConfig, SandboxConfig,
    SecurityConfig,
};
