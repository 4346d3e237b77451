//! Implementations of the `guardrails audit` subcommands.

use crate::cli::{AuditExportArgs, AuditFilterArgs, AuditSummaryArgs};
use guardrails::audit::{AuditFilter, AuditLogger, AuditSummary, NdjsonStore};
use guardrails::config::Config;
use guardrails::error::{GuardError, Result};
use std::fs;
use std::path::PathBuf;

/// Export matching events to stdout or `--output`.
pub fn cmd_export(config: &Config, args: AuditExportArgs) -> Result<()> {
    let logger = open_logger(config, &args.filter)?;
    let bytes = logger.export(args.format, &to_filter(&args.filter))?;

    match &args.output {
        Some(path) => fs::write(path, &bytes).map_err(|e| {
            GuardError::UserError(format!("failed to write '{}': {}", path.display(), e))
        }),
        None => {
            println!("{}", String::from_utf8_lossy(&bytes).trim_end());
            Ok(())
        }
    }
}

/// Print totals over matching events as JSON.
pub fn cmd_summary(config: &Config, args: AuditSummaryArgs) -> Result<()> {
    let logger = open_logger(config, &args.filter)?;
    let summary = summarize(&logger, &to_filter(&args.filter));

    let json = serde_json::to_string_pretty(&summary)
        .map_err(|e| GuardError::Serialization(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

fn summarize(logger: &AuditLogger, filter: &AuditFilter) -> AuditSummary {
    AuditSummary::from_events(&logger.filter(filter))
}

fn audit_path(config: &Config, args: &AuditFilterArgs) -> Result<PathBuf> {
    args.audit
        .clone()
        .or_else(|| config.audit_log_path.clone())
        .ok_or_else(|| {
            GuardError::UserError(
                "no audit log configured (pass --audit or set audit_log_path)".to_string(),
            )
        })
}

fn open_logger(config: &Config, args: &AuditFilterArgs) -> Result<AuditLogger> {
    AuditLogger::open(Box::new(NdjsonStore::new(audit_path(config, args)?)))
}

fn to_filter(args: &AuditFilterArgs) -> AuditFilter {
    AuditFilter {
        repo_name: args.repo.clone(),
        since: args.since,
        until: args.until,
    }
}
