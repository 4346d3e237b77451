//! Append-only audit trail of scans and overrides.
//!
//! Records are stored as NDJSON (one JSON object per line) by default:
//!
//! ```no_run
//! use guardrails::audit::{AuditLogger, AuditFilter, ExportFormat, NdjsonStore};
//!
//! let logger = AuditLogger::open(Box::new(NdjsonStore::new("audit/events.ndjson")))?;
//! let csv = logger.export(ExportFormat::Csv, &AuditFilter::repo("acme/web"))?;
//! # Ok::<(), guardrails::error::GuardError>(())
//! ```

mod export;
mod logger;
mod store;
mod types;


pub use export::{CSV_HEADER, export_events};
pub use logger::AuditLogger;
pub use store::{AuditStore, MemoryStore, NdjsonStore};
pub use types::{
    AuditEvent, AuditFilter, AuditSummary, ExportFormat, OverrideEvent, ScanEvent,
};
