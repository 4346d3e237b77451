//! Command implementations for guardrails.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Each handler returns the process exit code on success so
//! that `scan` can report a blocked merge without treating it as an error.

mod audit;
mod rules;
mod scan;

use crate::cli::{AuditAction, Cli, Command};
use guardrails::config::{Config, DEFAULT_CONFIG_FILE};
use guardrails::error::Result;
use guardrails::exit_codes;
use std::path::Path;
use tracing::debug;

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<i32> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Scan(args) => scan::cmd_scan(config, args),
        Command::Rules(args) => rules::cmd_rules(&config, args).map(|()| exit_codes::SUCCESS),
        Command::Audit(audit_cmd) => match audit_cmd.action {
            AuditAction::Export(args) => audit::cmd_export(&config, args),
            AuditAction::Summary(args) => audit::cmd_summary(&config, args),
        }
        .map(|()| exit_codes::SUCCESS),
    }
}

/// Load the explicit config file, else `./guardrails.yaml` when present,
/// else the built-in defaults.
fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::load(path);
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.is_file() {
        debug!(path = %default_path.display(), "loading config");
        Config::load(default_path)
    } else {
        Ok(Config::default())
    }
}
