//! The guard context: one instance of each stateful component and the
//! operations exposed to callers.

mod request;


pub use request::{EnforceOutcome, Review, ReviewRequest};

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};

use crate::audit::{AuditFilter, AuditLogger, AuditSummary, ExportFormat, NdjsonStore, ScanEvent};
use crate::config::Config;
use crate::error::Result;
use crate::license::LicenseChecker;
use crate::policy::{EnforcementDecision, OverrideToken, Policy, PolicyEngine, PolicyRegistry, TokenStore};
use crate::rules::{CompliancePack, Rule, RuleEngine, RulePlugin, ScanSummary, Violation, sort_violations};

/// Explicitly constructed context owning the rule registry, the policy
/// engine and the audit ledger.
#[derive(Debug)]
pub struct Guard {
    rules: RwLock<RuleEngine>,
    licenses: LicenseChecker,
    policies: PolicyEngine,
    audit: AuditLogger,
}

impl Guard {
    /// Build a context from config, with the given audit ledger.
    pub fn new(config: &Config, audit: AuditLogger) -> Result<Self> {
        config.validate()?;

        let rules = RuleEngine::from_config(config)?;
        let registry = PolicyRegistry::new(config.default_policy.clone());
        for (name, policy) in &config.policies {
            registry.register(name, policy.clone());
        }
        let tokens = TokenStore::new(config.override_token_ttl_hours);

        debug!(
            rules = rules.rules().len(),
            policies = config.policies.len(),
            "guard context ready"
        );

        Ok(Self {
            rules: RwLock::new(rules),
            licenses: LicenseChecker::new(config.max_snippet_chars),
            policies: PolicyEngine::new(registry, tokens),
            audit,
        })
    }

    /// Build a context whose audit ledger is the config's NDJSON file, or
    /// memory when no path is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let audit = match &config.audit_log_path {
            Some(path) => AuditLogger::open(Box::new(NdjsonStore::new(path)))?,
            None => AuditLogger::in_memory(),
        };
        Self::new(config, audit)
    }

    /// Read access to the rule registry.
    pub fn rules(&self) -> RwLockReadGuard<'_, RuleEngine> {
        self.rules.read().unwrap_or_else(|poison| poison.into_inner())
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub fn policy_for(&self, repo_name: &str) -> Policy {
        self.policies.policy_for(repo_name)
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    pub fn register_policy(&self, name: &str, policy: Policy) -> Result<()> {
        policy.validate(name)?;
        self.policies.registry().register(name, policy);
        Ok(())
    }

    /// Replace every policy with the ones in `config`.
    pub fn reload_policies(&self, config: &Config) -> Result<()> {
        config.validate()?;
        self.policies.registry().reload(
            config.default_policy.clone(),
            config
                .policies
                .iter()
                .map(|(name, policy)| (name.clone(), policy.clone())),
        );
        info!(policies = config.policies.len(), "policies reloaded");
        Ok(())
    }

    pub fn register_rule(&self, rule: Rule) -> Result<()> {
        self.rules_mut().register_rule(rule)
    }

    pub fn register_plugin(&self, plugin: Arc<dyn RulePlugin>) -> Result<()> {
        self.rules_mut().register_plugin(plugin)
    }

    pub fn register_compliance_pack(&self, pack: &CompliancePack) -> Result<()> {
        self.rules_mut().register_compliance_pack(pack)
    }

    fn rules_mut(&self) -> std::sync::RwLockWriteGuard<'_, RuleEngine> {
        self.rules.write().unwrap_or_else(|poison| poison.into_inner())
    }

    // ------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------

    /// Scan per-file diffs with every rule source under the repository's policy.
    pub fn scan(
        &self,
        files: &BTreeMap<String, String>,
        repo_name: &str,
        copilot_generated_files: &BTreeSet<String>,
    ) -> ScanSummary {
        let policy = self.policies.policy_for(repo_name);
        let rules = self.rules();
        let (selected, skipped) = rules.select_files(files, &policy);
        let scanned = selected.len();

        let mut violations: Vec<Violation> = Vec::new();
        for parsed in &selected {
            let copilot = copilot_generated_files.contains(&parsed.file_path);
            violations.extend(rules.scan_file(parsed, copilot, &policy));
            violations.extend(self.licenses.check_file(parsed, copilot, &policy));
        }

        sort_violations(&mut violations);
        let summary = ScanSummary::new(violations, scanned, skipped);
        info!(
            repo = %repo_name,
            scan_id = %summary.scan_id,
            violations = summary.violation_count,
            critical = summary.critical_count,
            high = summary.high_count,
            files_scanned = scanned,
            files_skipped = skipped,
            "scan complete"
        );
        summary
    }

    /// Decide whether violations block a merge, recording an applied override.
    pub fn enforce(
        &self,
        violations: &[Violation],
        repo_name: &str,
        override_token: Option<&str>,
    ) -> EnforceOutcome {
        self.enforce_at(violations, repo_name, override_token, None, Utc::now())
    }

    fn enforce_at(
        &self,
        violations: &[Violation],
        repo_name: &str,
        override_token: Option<&str>,
        pr_number: Option<u64>,
        now: DateTime<Utc>,
    ) -> EnforceOutcome {
        let enforcement = self
            .policies
            .enforce_at(violations, repo_name, override_token, now);

        let audit = match &enforcement.applied_token {
            Some(token) => self
                .audit
                .log_override_at(repo_name, pr_number, token, now)
                .map(Some),
            None => Ok(None),
        };
        if let Err(e) = &audit {
            warn!(repo = %repo_name, error = %e, "failed to record override");
        }

        EnforceOutcome {
            decision: enforcement.decision,
            audit,
        }
    }

    pub fn create_override_token(&self, repo_name: &str, reason: &str) -> OverrideToken {
        self.policies.create_override_token(repo_name, reason)
    }

    pub fn create_override_token_at(
        &self,
        repo_name: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> OverrideToken {
        self.policies.create_override_token_at(repo_name, reason, now)
    }

    pub fn log_scan(
        &self,
        repo_name: &str,
        pr_number: u64,
        commit_hash: &str,
        summary: &ScanSummary,
        decision: &EnforcementDecision,
    ) -> Result<ScanEvent> {
        self.audit
            .log_scan(repo_name, pr_number, commit_hash, summary, decision)
    }

    pub fn export_audit(&self, format: ExportFormat, filter: &AuditFilter) -> Result<Vec<u8>> {
        self.audit.export(format, filter)
    }

    pub fn audit_summary(&self) -> AuditSummary {
        self.audit.summary()
    }

    /// Scan, enforce and record one pull request.
    pub fn review(&self, request: &ReviewRequest, override_token: Option<&str>) -> Review {
        self.review_at(request, override_token, Utc::now())
    }

    pub fn review_at(
        &self,
        request: &ReviewRequest,
        override_token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Review {
        let summary = self.scan(
            &request.files,
            &request.repo_name,
            &request.copilot_generated_files,
        );
        let outcome = self.enforce_at(
            &summary.violations,
            &request.repo_name,
            override_token,
            Some(request.pr_number),
            now,
        );

        let mut audit_errors = Vec::new();
        let override_event = outcome.audit.unwrap_or_else(|e| {
            audit_errors.push(e.to_string());
            None
        });

        let scan_event = match self.audit.log_scan_at(
            &request.repo_name,
            request.pr_number,
            &request.commit_hash,
            &summary,
            &outcome.decision,
            now,
        ) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(repo = %request.repo_name, error = %e, "failed to record scan");
                audit_errors.push(e.to_string());
                None
            }
        };

        Review {
            summary,
            decision: outcome.decision,
            scan_event,
            override_event,
            audit_errors,
        }
    }
}
