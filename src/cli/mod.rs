//! CLI argument parsing for guardrails.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};
use guardrails::audit::ExportFormat;
use std::path::PathBuf;

/// Guardrails: policy-driven violation detection for code review diffs.
///
/// Scans the added lines of a pull request for security, AI-pattern and
/// license/IP findings, decides whether the merge should be blocked under
/// the repository's policy, and records the outcome in an audit log.
#[derive(Parser, Debug)]
#[command(name = "guardrails")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file (defaults to ./guardrails.yaml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug diagnostics to stderr (GUARDRAILS_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for guardrails.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Review a pull request and print the result as JSON.
    ///
    /// The input is either a review request (JSON object with repo_name,
    /// pr_number, commit_hash, files and copilot_generated_files) or the raw
    /// output of `git diff`. Exits with 2 when the merge is blocked.
    Scan(ScanArgs),

    /// List registered rules and compliance packs.
    Rules(RulesArgs),

    /// Query the audit log.
    Audit(AuditCommand),
}

/// Arguments for the `scan` command.
#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Review request JSON or unified diff file.
    pub input: PathBuf,

    /// Repository name (overrides the request's repo_name).
    #[arg(long)]
    pub repo: Option<String>,

    /// Pull request number.
    #[arg(long)]
    pub pr: Option<u64>,

    /// Head commit of the pull request.
    #[arg(long)]
    pub commit: Option<String>,

    /// Paths generated by an AI assistant.
    #[arg(long, value_delimiter = ',')]
    pub copilot: Vec<String>,

    /// Audit log file (overrides audit_log_path from config).
    #[arg(long)]
    pub audit: Option<PathBuf>,
}

/// Arguments for the `rules` command.
#[derive(Parser, Debug)]
pub struct RulesArgs {
    /// Show the severity each rule would have for this repository.
    #[arg(long)]
    pub repo: Option<String>,
}

/// Audit subcommand wrapper.
#[derive(Parser, Debug)]
pub struct AuditCommand {
    #[command(subcommand)]
    pub action: AuditAction,
}

/// Audit subcommands.
#[derive(Subcommand, Debug)]
pub enum AuditAction {
    /// Export audit events as JSON or CSV.
    Export(AuditExportArgs),

    /// Print aggregate counts over audit events.
    Summary(AuditSummaryArgs),
}

/// Event selection shared by the audit subcommands.
#[derive(Args, Debug, Default)]
pub struct AuditFilterArgs {
    /// Audit log file (overrides audit_log_path from config).
    #[arg(long)]
    pub audit: Option<PathBuf>,

    /// Only events for this repository.
    #[arg(long)]
    pub repo: Option<String>,

    /// Only events at or after this time (RFC 3339 or YYYY-MM-DD).
    #[arg(long, value_parser = parse_since)]
    pub since: Option<DateTime<Utc>>,

    /// Only events at or before this time (RFC 3339 or YYYY-MM-DD, whole day).
    #[arg(long, value_parser = parse_until)]
    pub until: Option<DateTime<Utc>>,
}

/// Arguments for `audit export`.
#[derive(Parser, Debug)]
pub struct AuditExportArgs {
    /// Output format (json, csv).
    #[arg(long, default_value_t = ExportFormat::Json)]
    pub format: ExportFormat,

    /// Write to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub filter: AuditFilterArgs,
}

/// Arguments for `audit summary`.
#[derive(Parser, Debug)]
pub struct AuditSummaryArgs {
    #[command(flatten)]
    pub filter: AuditFilterArgs,
}

fn parse_timestamp(value: &str, time: NaiveTime) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(time).and_utc())
        .map_err(|_| format!("'{}' is not an RFC 3339 timestamp or YYYY-MM-DD date", value))
}

fn parse_since(value: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(value, NaiveTime::MIN)
}

fn parse_until(value: &str) -> Result<DateTime<Utc>, String> {
    let end_of_day = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
        .ok_or_else(|| "invalid end of day".to_string())?;
    parse_timestamp(value, end_of_day)
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
