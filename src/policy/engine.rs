//! Turns violations into an enforcement decision.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::registry::PolicyRegistry;
use super::tokens::{OverrideToken, TokenStore, token_hint};
use super::types::{Action, EnforcementDecision, EnforcementMode, Policy};
use crate::rules::{Severity, Violation};

/// A decision plus the token that unblocked it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enforcement {
    pub decision: EnforcementDecision,
    pub applied_token: Option<OverrideToken>,
}

/// Policy registry plus override tokens.
#[derive(Debug, Default)]
pub struct PolicyEngine {
    registry: PolicyRegistry,
    tokens: TokenStore,
}

impl PolicyEngine {
    pub fn new(registry: PolicyRegistry, tokens: TokenStore) -> Self {
        Self { registry, tokens }
    }

    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn policy_for(&self, repo_name: &str) -> Policy {
        self.registry.resolve(repo_name)
    }

    pub fn create_override_token(&self, repo_name: &str, reason: &str) -> OverrideToken {
        self.create_override_token_at(repo_name, reason, Utc::now())
    }

    pub fn create_override_token_at(
        &self,
        repo_name: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> OverrideToken {
        let token = self.tokens.create_at(repo_name, reason, now);
        info!(
            repo = %repo_name,
            token = %token.hint(),
            expires_at = %token.expires_at,
            "issued override token"
        );
        token
    }

    /// Decide whether the violations block a merge in `repo_name`.
    pub fn enforce(
        &self,
        violations: &[Violation],
        repo_name: &str,
        override_token: Option<&str>,
    ) -> Enforcement {
        self.enforce_at(violations, repo_name, override_token, Utc::now())
    }

    pub fn enforce_at(
        &self,
        violations: &[Violation],
        repo_name: &str,
        override_token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Enforcement {
        let policy = self.registry.resolve(repo_name);
        let mut decision = evaluate(&policy, violations, repo_name);
        let mut applied_token = None;

        if decision.should_block
            && let Some(token) = override_token
        {
            match self.tokens.validate_at(token, repo_name, now) {
                Ok(valid) => {
                    decision.should_block = false;
                    decision.override_applied = true;
                    decision.action = Action::OverrideApplied;
                    info!(repo = %repo_name, token = %valid.hint(), "override applied");
                    applied_token = Some(valid);
                }
                Err(rejection) => {
                    warn!(
                        repo = %repo_name,
                        token = %token_hint(token),
                        rejection = %rejection,
                        "override token rejected"
                    );
                    decision.override_rejected = Some(rejection);
                }
            }
        }

        info!(
            repo = %repo_name,
            mode = %decision.enforcement_mode,
            action = %decision.action,
            violations = decision.violation_count,
            "enforcement decided"
        );

        Enforcement {
            decision,
            applied_token,
        }
    }
}

/// Apply a policy to violations, without override handling.
pub fn evaluate(policy: &Policy, violations: &[Violation], repo_name: &str) -> EnforcementDecision {
    let counted: Vec<&Violation> = violations
        .iter()
        .filter(|v| policy.category_enabled(v.category))
        .collect();
    let filtered_count = violations.len() - counted.len();

    let critical_count = counted.iter().filter(|v| v.severity == Severity::Critical).count();
    let high_count = counted.iter().filter(|v| v.severity == Severity::High).count();
    let license_blocking_count = counted.iter().filter(|v| v.is_blocking_license()).count();
    let violation_count = counted.len();

    let (should_block, reason, action) = match policy.enforcement_mode {
        EnforcementMode::Advisory => (false, None, Action::AdvisoryReport),
        EnforcementMode::Warning => (false, None, warned_or_passed(violation_count)),
        EnforcementMode::Blocking => {
            let mut reasons = Vec::new();
            if policy.block_on_critical && critical_count > 0 {
                reasons.push(format!("{} critical violation(s)", critical_count));
            }
            if policy.block_on_high && high_count > 0 {
                reasons.push(format!("{} high severity violation(s)", high_count));
            }
            if license_blocking_count > 0 {
                reasons.push(format!("{} license violation(s)", license_blocking_count));
            }

            if reasons.is_empty() {
                (false, None, warned_or_passed(violation_count))
            } else {
                let reason = format!("Blocking due to {}", reasons.join(", "));
                (true, Some(reason), Action::Blocked)
            }
        }
    };

    EnforcementDecision {
        repo_name: repo_name.to_string(),
        enforcement_mode: policy.enforcement_mode,
        should_block,
        reason,
        override_applied: false,
        override_rejected: None,
        action,
        violation_count,
        critical_count,
        high_count,
        license_blocking_count,
        filtered_count,
    }
}

fn warned_or_passed(violation_count: usize) -> Action {
    if violation_count > 0 {
        Action::Warned
    } else {
        Action::Passed
    }
}
