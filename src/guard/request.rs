//! Inputs and outputs of a full review.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::audit::{OverrideEvent, ScanEvent};
use crate::error::Result;
use crate::policy::EnforcementDecision;
use crate::rules::ScanSummary;

/// A pull request to review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewRequest {
    pub repo_name: String,
    pub pr_number: u64,
    pub commit_hash: String,
    /// Per-file diffs keyed by repository-relative path.
    pub files: BTreeMap<String, String>,
    /// Paths declared as AI-generated.
    pub copilot_generated_files: BTreeSet<String>,
}

/// Result of [`super::Guard::enforce`].
///
/// `audit` reports whether recording an applied override succeeded; it never
/// changes `decision`.
#[derive(Debug)]
pub struct EnforceOutcome {
    pub decision: EnforcementDecision,
    pub audit: Result<Option<OverrideEvent>>,
}

/// Result of [`super::Guard::review`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub summary: ScanSummary,
    pub decision: EnforcementDecision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_event: Option<ScanEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_event: Option<OverrideEvent>,
    /// Audit writes that failed; the decision stands regardless.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audit_errors: Vec<String>,
}

impl Review {
    pub fn audit_failed(&self) -> bool {
        !self.audit_errors.is_empty()
    }
}
