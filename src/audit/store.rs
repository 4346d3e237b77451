//! Where audit records are persisted.

use crate::error::{GuardError, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

use super::types::AuditEvent;

/// Append-only persistence for audit records.
///
/// Records are never updated or deleted.
pub trait AuditStore: Send + Sync {
    /// Durably append one record.
    fn append(&self, event: &AuditEvent) -> Result<()>;

    /// Every record previously appended, in append order.
    fn load(&self) -> Result<Vec<AuditEvent>>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// NDJSON file store: one JSON object per line, synced after each append.
#[derive(Debug, Clone)]
pub struct NdjsonStore {
    path: PathBuf,
}

impl NdjsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditStore for NdjsonStore {
    fn append(&self, event: &AuditEvent) -> Result<()> {
        let json_line = serde_json::to_string(event).map_err(|e| {
            GuardError::Serialization(format!("failed to serialize audit event: {}", e))
        })?;

        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
            && !dir.exists()
        {
            fs::create_dir_all(dir).map_err(|e| {
                GuardError::AuditWrite(format!(
                    "failed to create audit directory '{}': {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                GuardError::AuditWrite(format!(
                    "failed to open audit log '{}': {}",
                    self.path.display(),
                    e
                ))
            })?;

        writeln!(file, "{}", json_line).map_err(|e| {
            GuardError::AuditWrite(format!(
                "failed to write audit event to '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        file.sync_all().map_err(|e| {
            GuardError::AuditWrite(format!(
                "failed to sync audit log '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    fn load(&self) -> Result<Vec<AuditEvent>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            GuardError::AuditWrite(format!(
                "failed to read audit log '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        let mut events = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditEvent>(line) {
                Ok(event) => events.push(event),
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = idx + 1,
                    error = %e,
                    "skipping malformed audit record"
                ),
            }
        }
        Ok(events)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Volatile store for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditStore for MemoryStore {
    fn append(&self, event: &AuditEvent) -> Result<()> {
        self.events
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(event.clone());
        Ok(())
    }

    fn load(&self) -> Result<Vec<AuditEvent>> {
        Ok(self
            .events
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
