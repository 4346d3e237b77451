//! Audit records and queries over them.

use crate::error::GuardError;
use crate::policy::{Action, EnforcementMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One completed scan and the decision taken on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEvent {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub repo_name: String,
    pub pr_number: u64,
    pub commit_hash: String,
    pub violation_count: usize,
    pub critical_count: usize,
    pub high_count: usize,
    pub enforcement_mode: EnforcementMode,
    pub action_taken: Action,
    pub blocked: bool,
    pub override_applied: bool,
    pub scan_id: String,
    /// The owner string (e.g., `user@HOST`).
    pub actor: String,
}

/// An override token that unblocked a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEvent {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub repo_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<u64>,
    pub reason: String,
    /// Leading characters of the token only.
    pub token_hint: String,
    pub expires_at: DateTime<Utc>,
    pub actor: String,
}

/// A record in the audit ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    Scan(ScanEvent),
    Override(OverrideEvent),
}

impl AuditEvent {
    pub fn event_id(&self) -> &str {
        match self {
            AuditEvent::Scan(e) => &e.event_id,
            AuditEvent::Override(e) => &e.event_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            AuditEvent::Scan(e) => e.timestamp,
            AuditEvent::Override(e) => e.timestamp,
        }
    }

    pub fn repo_name(&self) -> &str {
        match self {
            AuditEvent::Scan(e) => &e.repo_name,
            AuditEvent::Override(e) => &e.repo_name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AuditEvent::Scan(_) => "scan",
            AuditEvent::Override(_) => "override",
        }
    }
}

/// Selects a subset of events. Empty fields match everything; the date
/// range is inclusive at both ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub repo_name: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl AuditFilter {
    pub fn repo(repo_name: impl Into<String>) -> Self {
        Self {
            repo_name: Some(repo_name.into()),
            ..Self::default()
        }
    }

    pub fn between(since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self {
            since: Some(since),
            until: Some(until),
            ..Self::default()
        }
    }

    pub fn matches(&self, event: &AuditEvent) -> bool {
        let ts = event.timestamp();
        self.repo_name
            .as_deref()
            .is_none_or(|repo| event.repo_name() == repo)
            && self.since.is_none_or(|since| ts >= since)
            && self.until.is_none_or(|until| ts <= until)
    }
}

/// Export encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Array of tagged records, lossless.
    #[default]
    Json,
    /// Flattened rows under a fixed header.
    Csv,
}

impl FromStr for ExportFormat {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(GuardError::UserError(format!(
                "unknown export format '{}' (expected json or csv)",
                other
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        })
    }
}

/// Totals across the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total_scans: usize,
    pub total_violations: usize,
    pub total_critical: usize,
    pub total_high: usize,
    pub total_blocked: usize,
    pub total_overrides: usize,
}

impl AuditSummary {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a AuditEvent>) -> Self {
        let mut summary = Self::default();
        for event in events {
            match event {
                AuditEvent::Scan(scan) => {
                    summary.total_scans += 1;
                    summary.total_violations += scan.violation_count;
                    summary.total_critical += scan.critical_count;
                    summary.total_high += scan.high_count;
                    if scan.blocked {
                        summary.total_blocked += 1;
                    }
                }
                AuditEvent::Override(_) => summary.total_overrides += 1,
            }
        }
        summary
    }
}
