//! Harness Configuration (harness.toml)
//!
//! Every key is optional; missing keys fall back to the built-in defaults.
//!
//! ```toml
//! timeout_secs = 5
//! extension = "hy"
//! marker = "//> "
//! ```

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Seconds a test case may run before it is killed
pub const DEFAULT_TIMEOUT_SECS: u64 = 2;

/// Extension of Hydrogen test scripts
pub const DEFAULT_EXTENSION: &str = "hy";

/// Comment marker that introduces one line of expected output
pub const DEFAULT_MARKER: &str = "//> ";

/// Harness configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Per-test kill deadline in seconds (default: 2)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Test file extension without the leading dot (default: "hy")
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Expected-output annotation marker (default: "//> ")
    #[serde(default = "default_marker")]
    pub marker: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            extension: default_extension(),
            marker: default_marker(),
        }
    }
}

impl HarnessConfig {
    /// Load harness configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.normalized()
    }

    /// Parse harness configuration from TOML text
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::TomlParseError {
            file: "<string>".into(),
            error: e,
        })?;

        config.normalized()
    }

    /// Validate the harness configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs".to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }

        let extension = strip_dot(&self.extension);
        if extension.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "extension".to_string(),
                reason: "extension cannot be empty".to_string(),
            });
        }
        // Path::extension never yields a dot or a separator
        if extension.contains(['.', '/', '\\']) {
            return Err(ConfigError::InvalidValue {
                field: "extension".to_string(),
                reason: format!("'{}' is not a file extension", self.extension),
            });
        }

        if self.marker.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "marker".to_string(),
                reason: "marker cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Per-test kill deadline
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Override the deadline (CLI flag), revalidating the result
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> ConfigResult<Self> {
        self.timeout_secs = timeout_secs;
        self.validate()?;
        Ok(self)
    }

    fn normalized(mut self) -> ConfigResult<Self> {
        self.validate()?;
        self.extension = strip_dot(&self.extension).to_string();
        Ok(self)
    }
}

// ".hy" and "hy" name the same extension
fn strip_dot(extension: &str) -> &str {
    extension.strip_prefix('.').unwrap_or(extension)
}
