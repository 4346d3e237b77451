//! Aggregated result of one scan.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{Severity, Violation};

/// Violations of one scan plus their counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub scan_id: String,
    pub violations: Vec<Violation>,
    pub violation_count: usize,
    pub critical_count: usize,
    pub high_count: usize,
    pub medium_count: usize,
    pub low_count: usize,
    pub info_count: usize,
    pub copilot_violation_count: usize,
    pub files_scanned: usize,
    pub files_skipped: usize,
}

impl ScanSummary {
    /// Summarize a sorted violation list under a fresh scan id.
    pub fn new(violations: Vec<Violation>, files_scanned: usize, files_skipped: usize) -> Self {
        Self::with_scan_id(
            Uuid::new_v4().to_string(),
            violations,
            files_scanned,
            files_skipped,
        )
    }

    pub fn with_scan_id(
        scan_id: String,
        violations: Vec<Violation>,
        files_scanned: usize,
        files_skipped: usize,
    ) -> Self {
        let count = |severity: Severity| violations.iter().filter(|v| v.severity == severity).count();

        Self {
            scan_id,
            violation_count: violations.len(),
            critical_count: count(Severity::Critical),
            high_count: count(Severity::High),
            medium_count: count(Severity::Medium),
            low_count: count(Severity::Low),
            info_count: count(Severity::Info),
            copilot_violation_count: violations.iter().filter(|v| v.is_copilot_generated).count(),
            files_scanned,
            files_skipped,
            violations,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}
