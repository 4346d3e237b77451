//! JSON and CSV encodings of the ledger.

use crate::error::{GuardError, Result};

use super::types::{AuditEvent, ExportFormat};

/// Column order of the CSV export.
pub const CSV_HEADER: &[&str] = &[
    "event_type",
    "event_id",
    "timestamp",
    "repo_name",
    "pr_number",
    "commit_hash",
    "violation_count",
    "critical_count",
    "high_count",
    "enforcement_mode",
    "action_taken",
    "blocked",
    "override_applied",
    "scan_id",
    "reason",
    "token_hint",
    "expires_at",
    "actor",
];

pub fn export_events(events: &[AuditEvent], format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Json => serde_json::to_vec_pretty(events).map_err(|e| {
            GuardError::Serialization(format!("failed to serialize audit export: {}", e))
        }),
        ExportFormat::Csv => Ok(to_csv(events)),
    }
}

fn to_csv(events: &[AuditEvent]) -> Vec<u8> {
    let mut buf = String::new();
    buf.push_str(&CSV_HEADER.join(","));
    buf.push('\n');

    for event in events {
        let row: Vec<String> = match event {
            AuditEvent::Scan(e) => vec![
                "scan".to_string(),
                e.event_id.clone(),
                e.timestamp.to_rfc3339(),
                e.repo_name.clone(),
                e.pr_number.to_string(),
                e.commit_hash.clone(),
                e.violation_count.to_string(),
                e.critical_count.to_string(),
                e.high_count.to_string(),
                e.enforcement_mode.to_string(),
                e.action_taken.to_string(),
                e.blocked.to_string(),
                e.override_applied.to_string(),
                e.scan_id.clone(),
                String::new(),
                String::new(),
                String::new(),
                e.actor.clone(),
            ],
            AuditEvent::Override(e) => vec![
                "override".to_string(),
                e.event_id.clone(),
                e.timestamp.to_rfc3339(),
                e.repo_name.clone(),
                e.pr_number.map(|n| n.to_string()).unwrap_or_default(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                "true".to_string(),
                String::new(),
                e.reason.clone(),
                e.token_hint.clone(),
                e.expires_at.to_rfc3339(),
                e.actor.clone(),
            ],
        };

        let escaped: Vec<String> = row.iter().map(|field| csv_escape(field)).collect();
        buf.push_str(&escaped.join(","));
        buf.push('\n');
    }

    buf.into_bytes()
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
