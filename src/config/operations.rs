//! Config loading, validation, and utility operations.

use super::model::Config;
use crate::error::{GuardError, Result};
use crate::rules::CompliancePack;
use std::path::Path;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the guardrails.yaml file
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(GuardError::Config)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            GuardError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| GuardError::Config(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| GuardError::Config(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `override_token_ttl_hours` and `max_snippet_chars` must be positive
    /// - `scan_extensions` entries must be non-empty and have no leading dots
    /// - `compliance_packs` must name shipped packs
    /// - every policy must have valid globs and non-empty rule ids
    pub fn validate(&self) -> Result<()> {
        if self.override_token_ttl_hours == 0 {
            return Err(GuardError::Config(
                "override_token_ttl_hours must be greater than 0".to_string(),
            ));
        }

        if self.max_snippet_chars == 0 {
            return Err(GuardError::Config(
                "max_snippet_chars must be greater than 0".to_string(),
            ));
        }

        for ext in &self.scan_extensions {
            if ext.is_empty() {
                return Err(GuardError::Config(
                    "scan_extensions entries must be non-empty".to_string(),
                ));
            }
            if ext.starts_with('.') {
                return Err(GuardError::Config(format!(
                    "scan_extensions entries must not have leading dots (found '{}'). Use '{}' instead.",
                    ext,
                    ext.trim_start_matches('.')
                )));
            }
        }

        for name in &self.compliance_packs {
            if CompliancePack::builtin(name).is_none() {
                return Err(GuardError::Config(format!(
                    "unknown compliance pack '{}'",
                    name
                )));
            }
        }

        self.default_policy.validate("default")?;
        for (name, policy) in &self.policies {
            policy.validate(name)?;
        }

        Ok(())
    }

    /// Get scan_extensions normalized to lowercase.
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.scan_extensions
            .iter()
            .map(|s| s.to_lowercase())
            .collect()
    }
}
