//! The append-only audit ledger.

use chrono::{DateTime, Utc};
use std::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::export::export_events;
use super::store::{AuditStore, MemoryStore};
use super::types::{AuditEvent, AuditFilter, AuditSummary, ExportFormat, OverrideEvent, ScanEvent};
use crate::error::Result;
use crate::policy::{EnforcementDecision, OverrideToken};
use crate::rules::ScanSummary;

/// Records scan and override events.
///
/// Each append writes to the store first and only then makes the record
/// visible to readers; both happen under one lock so appends are serialized.
pub struct AuditLogger {
    store: Box<dyn AuditStore>,
    events: Mutex<Vec<AuditEvent>>,
    actor: String,
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger")
            .field("store", &self.store.describe())
            .field("actor", &self.actor)
            .finish_non_exhaustive()
    }
}

impl AuditLogger {
    /// Open a ledger over a store, loading the records it already holds.
    pub fn open(store: Box<dyn AuditStore>) -> Result<Self> {
        let existing = store.load()?;
        debug!(store = %store.describe(), records = existing.len(), "opened audit log");
        Ok(Self {
            store,
            events: Mutex::new(existing),
            actor: get_actor_string(),
        })
    }

    /// A ledger that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            store: Box::new(MemoryStore::new()),
            events: Mutex::new(Vec::new()),
            actor: get_actor_string(),
        }
    }

    /// Record a completed scan and its decision.
    pub fn log_scan(
        &self,
        repo_name: &str,
        pr_number: u64,
        commit_hash: &str,
        summary: &ScanSummary,
        decision: &EnforcementDecision,
    ) -> Result<ScanEvent> {
        self.log_scan_at(repo_name, pr_number, commit_hash, summary, decision, Utc::now())
    }

    pub fn log_scan_at(
        &self,
        repo_name: &str,
        pr_number: u64,
        commit_hash: &str,
        summary: &ScanSummary,
        decision: &EnforcementDecision,
        now: DateTime<Utc>,
    ) -> Result<ScanEvent> {
        let event = ScanEvent {
            event_id: Uuid::new_v4().to_string(),
            timestamp: now,
            repo_name: repo_name.to_string(),
            pr_number,
            commit_hash: commit_hash.to_string(),
            violation_count: decision.violation_count,
            critical_count: decision.critical_count,
            high_count: decision.high_count,
            enforcement_mode: decision.enforcement_mode,
            action_taken: decision.action,
            blocked: decision.should_block,
            override_applied: decision.override_applied,
            scan_id: summary.scan_id.clone(),
            actor: self.actor.clone(),
        };

        self.append(AuditEvent::Scan(event.clone()))?;
        info!(
            repo = %repo_name,
            pr = pr_number,
            action = %event.action_taken,
            "logged scan event"
        );
        Ok(event)
    }

    /// Record that an override token unblocked a decision.
    pub fn log_override(
        &self,
        repo_name: &str,
        pr_number: Option<u64>,
        token: &OverrideToken,
    ) -> Result<OverrideEvent> {
        self.log_override_at(repo_name, pr_number, token, Utc::now())
    }

    pub fn log_override_at(
        &self,
        repo_name: &str,
        pr_number: Option<u64>,
        token: &OverrideToken,
        now: DateTime<Utc>,
    ) -> Result<OverrideEvent> {
        let event = OverrideEvent {
            event_id: Uuid::new_v4().to_string(),
            timestamp: now,
            repo_name: repo_name.to_string(),
            pr_number,
            reason: token.reason.clone(),
            token_hint: token.hint(),
            expires_at: token.expires_at,
            actor: self.actor.clone(),
        };

        self.append(AuditEvent::Override(event.clone()))?;
        info!(repo = %repo_name, token = %event.token_hint, "logged override event");
        Ok(event)
    }

    fn append(&self, event: AuditEvent) -> Result<()> {
        let mut events = self.events.lock().unwrap_or_else(|poison| poison.into_inner());
        self.store.append(&event)?;
        events.push(event);
        Ok(())
    }

    /// Every record, in insertion order.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.filter(&AuditFilter::default())
    }

    pub fn filter(&self, filter: &AuditFilter) -> Vec<AuditEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect()
    }

    pub fn get_events_by_repo(&self, repo_name: &str) -> Vec<AuditEvent> {
        self.filter(&AuditFilter::repo(repo_name))
    }

    /// Records with `start <= timestamp <= end`.
    pub fn get_events_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<AuditEvent> {
        self.filter(&AuditFilter::between(start, end))
    }

    pub fn summary(&self) -> AuditSummary {
        let events = self.events.lock().unwrap_or_else(|poison| poison.into_inner());
        AuditSummary::from_events(events.iter())
    }

    pub fn export(&self, format: ExportFormat, filter: &AuditFilter) -> Result<Vec<u8>> {
        export_events(&self.filter(filter), format)
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Get the actor string for audit records.
fn get_actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}
