//! Config struct definition and default implementation.

use super::types::*;
use crate::policy::Policy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Configuration for a guardrails deployment.
///
/// This struct represents the contents of `guardrails.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Policies
    // =========================================================================
    /// Policy for repositories with no repo or organization entry.
    pub default_policy: Policy,

    /// Policies keyed by `org/repo` or by `org`.
    pub policies: BTreeMap<String, Policy>,

    /// Lifetime of override tokens.
    #[serde(default = "default_override_token_ttl_hours")]
    pub override_token_ttl_hours: u32,

    // =========================================================================
    // Scanning
    // =========================================================================
    /// File extensions to scan (no leading dots).
    #[serde(default = "default_scan_extensions")]
    pub scan_extensions: Vec<String>,

    /// Compliance packs registered at startup, by name.
    pub compliance_packs: Vec<String>,

    /// Characters kept from an offending line in a violation.
    #[serde(default = "default_max_snippet_chars")]
    pub max_snippet_chars: usize,

    // =========================================================================
    // Audit
    // =========================================================================
    /// NDJSON audit log. Records stay in memory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_log_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_policy: Policy::default(),
            policies: BTreeMap::new(),
            override_token_ttl_hours: default_override_token_ttl_hours(),
            scan_extensions: default_scan_extensions(),
            compliance_packs: Vec::new(),
            max_snippet_chars: default_max_snippet_chars(),
            audit_log_path: None,
        }
    }
}
