//! Policy data and the decisions produced from it.

use crate::error::{GuardError, Result};
use crate::rules::{Category, Severity};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::warn;

/// How violations translate into merge outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnforcementMode {
    /// Report only; never blocks.
    #[default]
    Advisory,
    /// Report and flag; never blocks.
    Warning,
    /// Report, flag, and block merges per the policy thresholds.
    Blocking,
}

impl EnforcementMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnforcementMode::Advisory => "advisory",
            EnforcementMode::Warning => "warning",
            EnforcementMode::Blocking => "blocking",
        }
    }
}

impl fmt::Display for EnforcementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enforcement rules for one repository or organization.
///
/// Unknown YAML fields are ignored; missing fields take the organization
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub enforcement_mode: EnforcementMode,

    pub block_on_critical: bool,

    pub block_on_high: bool,

    /// Restrictive licenses explicitly accepted (matched case-insensitively).
    pub allowed_licenses: Vec<String>,

    /// Categories whose rules are evaluated and counted.
    pub enabled_categories: BTreeSet<Category>,

    /// Per-rule severity, taking precedence over packs and built-ins.
    pub severity_overrides: BTreeMap<String, Severity>,

    /// Rule ids never evaluated under this policy.
    pub disabled_rules: BTreeSet<String>,

    /// Path globs never scanned under this policy.
    pub exclude_paths: Vec<String>,
}

pub fn default_allowed_licenses() -> Vec<String> {
    ["MIT", "Apache-2.0", "GPL-3.0", "BSD-3-Clause"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            enforcement_mode: EnforcementMode::Advisory,
            block_on_critical: true,
            block_on_high: false,
            allowed_licenses: default_allowed_licenses(),
            enabled_categories: Category::ALL.into_iter().collect(),
            severity_overrides: BTreeMap::new(),
            disabled_rules: BTreeSet::new(),
            exclude_paths: Vec::new(),
        }
    }
}

impl Policy {
    /// A default policy in the given mode.
    pub fn with_mode(enforcement_mode: EnforcementMode) -> Self {
        Self {
            enforcement_mode,
            ..Self::default()
        }
    }

    pub fn category_enabled(&self, category: Category) -> bool {
        self.enabled_categories.contains(&category)
    }

    pub fn allows_license(&self, license: &str) -> bool {
        self.allowed_licenses
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(license))
    }

    /// Compile `exclude_paths`. Invalid globs are skipped with a warning;
    /// [`Policy::validate`] rejects them at load time.
    pub fn exclude_globs(&self) -> GlobSet {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude_paths {
            match Glob::new(&pattern.replace('\\', "/")) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => warn!(pattern = %pattern, error = %e, "ignoring invalid exclude glob"),
            }
        }
        builder.build().unwrap_or_else(|e| {
            warn!(error = %e, "failed to compile exclude globs");
            GlobSet::empty()
        })
    }

    /// Check values that would otherwise only fail at scan time.
    pub fn validate(&self, name: &str) -> Result<()> {
        for pattern in &self.exclude_paths {
            Glob::new(&pattern.replace('\\', "/")).map_err(|e| {
                GuardError::Config(format!(
                    "policy '{}': invalid exclude_paths glob '{}': {}",
                    name, pattern, e
                ))
            })?;
        }

        for rule_id in self.severity_overrides.keys().chain(self.disabled_rules.iter()) {
            if rule_id.trim().is_empty() {
                return Err(GuardError::Config(format!(
                    "policy '{}': rule ids must be non-empty",
                    name
                )));
            }
        }

        Ok(())
    }
}

/// The action recorded for an enforcement decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    AdvisoryReport,
    Warned,
    Passed,
    Blocked,
    OverrideApplied,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::AdvisoryReport => "advisory_report",
            Action::Warned => "warned",
            Action::Passed => "passed",
            Action::Blocked => "blocked",
            Action::OverrideApplied => "override_applied",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a presented override token did not unblock a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideRejection {
    NotFound,
    Expired,
    RepoMismatch,
}

impl fmt::Display for OverrideRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OverrideRejection::NotFound => "not_found",
            OverrideRejection::Expired => "expired",
            OverrideRejection::RepoMismatch => "repo_mismatch",
        })
    }
}

/// Verdict for one set of violations under one policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementDecision {
    pub repo_name: String,
    pub enforcement_mode: EnforcementMode,
    pub should_block: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub override_applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_rejected: Option<OverrideRejection>,
    pub action: Action,
    /// Violations counted under the policy (enabled categories only).
    pub violation_count: usize,
    pub critical_count: usize,
    pub high_count: usize,
    pub license_blocking_count: usize,
    /// Violations excluded because their category is disabled.
    pub filtered_count: usize,
}
