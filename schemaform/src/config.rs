//! Session configuration.
//!
//! ```toml
//! error_separator = " and "
//! validate_on_init = true
//! validate_on_change = false
//! validate_formats = false
//! max_ref_depth = 32
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Tunables of a form session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Joins several error messages of one control.
    pub error_separator: String,
    /// Run the validator when the session starts.
    pub validate_on_init: bool,
    /// Run the validator after every data update.
    pub validate_on_change: bool,
    /// Check `format` keywords (date, email, ...) during validation.
    pub validate_formats: bool,
    /// Longest `$ref` chain followed while resolving a scope.
    pub max_ref_depth: usize,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            error_separator: " and ".to_string(),
            validate_on_init: true,
            validate_on_change: false,
            validate_formats: false,
            max_ref_depth: 32,
        }
    }
}

impl FormsConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}
