//! # Decode Configuration
//!
//! The serde-loadable part of [`DecodeOptions`]: requested rules, type
//! overrides and the schema cache switch. Hooks are code and are attached to
//! the options afterwards.
//!
//! ```yaml
//! rules: [required, invalid_type]
//! overrides:
//!   - type_name: Uuid
//!     wire_type: string
//! cache_schemas: true
//! ```
//!
//! Rule names accept the aliases listed on [`RuleCategory`]. Every key is
//! optional; an empty document requests no validation.

use std::path::Path;

use lenient_core::{LenientError, RuleCategory, TypeOverride};
use serde::{Deserialize, Serialize};

use crate::decoder::DecodeOptions;

/// Decode settings as read from a configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeConfig {
    pub rules: Vec<RuleCategory>,
    pub overrides: Vec<TypeOverride>,
    pub cache_schemas: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            overrides: Vec::new(),
            cache_schemas: true,
        }
    }
}

impl DecodeConfig {
    pub fn from_json_str(source: &str) -> Result<Self, LenientError> {
        serde_json::from_str(source).map_err(|e| LenientError::Config {
            source_name: "<json>".to_string(),
            reason: format!("invalid JSON: {e}"),
        })
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, LenientError> {
        Self::parse_yaml(source, "<yaml>")
    }

    /// Loads a configuration file. `.json` files are read as JSON, anything
    /// else as YAML (which also accepts JSON documents).
    ///
    /// # Errors
    ///
    /// [`LenientError::Io`] if the file cannot be read,
    /// [`LenientError::Config`] if its content does not parse.
    pub fn from_file(path: &Path) -> Result<Self, LenientError> {
        let content = std::fs::read_to_string(path)?;
        let source_name = path.display().to_string();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            serde_json::from_str(&content).map_err(|e| LenientError::Config {
                source_name: source_name.clone(),
                reason: format!("invalid JSON: {e}"),
            })?
        } else {
            Self::parse_yaml(&content, &source_name)?
        };
        tracing::debug!(
            source = %source_name,
            rules = config.rules.len(),
            overrides = config.overrides.len(),
            "loaded decode configuration"
        );
        Ok(config)
    }

    /// Converts into options without hooks.
    pub fn into_options(self) -> DecodeOptions {
        DecodeOptions::new()
            .with_rules(self.rules)
            .with_overrides(self.overrides)
            .cache_schemas(self.cache_schemas)
    }

    fn parse_yaml(source: &str, source_name: &str) -> Result<Self, LenientError> {
        // An empty YAML document is null, not an empty mapping.
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(source).map_err(|e| LenientError::Config {
            source_name: source_name.to_string(),
            reason: format!("invalid YAML: {e}"),
        })
    }
}

impl From<DecodeConfig> for DecodeOptions {
    fn from(config: DecodeConfig) -> Self {
        config.into_options()
    }
}
