//! Hytest Configuration
//!
//! Settings shared by every run of the conformance harness:
//! - Per-test kill deadline
//! - Recognized test-file extension
//! - Expected-output annotation marker
//!
//! # Configuration Hierarchy
//!
//! Values are resolved in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Config file (`--config harness.toml`)
//! 3. CLI flags (handled by caller)
//!
//! # Example
//!
//! ```no_run
//! use hytest_config::HarnessConfig;
//! use std::path::Path;
//!
//! let config = HarnessConfig::load_from_file(Path::new("harness.toml")).unwrap();
//! println!("{:?}", config.timeout());
//! ```

pub mod harness;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use harness::{
    HarnessConfig, DEFAULT_EXTENSION, DEFAULT_MARKER, DEFAULT_TIMEOUT_SECS,
};
