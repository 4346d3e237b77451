//! Tests for policy resolution, tokens and enforcement.

use super::*;
use crate::rules::{Category, Severity};
use crate::test_support::{fixed_now, violation, violations};
use chrono::Duration;

fn blocking_engine(repo: &str) -> PolicyEngine {
    let engine = PolicyEngine::default();
    engine
        .registry()
        .register(repo, Policy::with_mode(EnforcementMode::Blocking));
    engine
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_unknown_repo_falls_back_to_default() {
    let registry = PolicyRegistry::default();
    let policy = registry.resolve("acme/unknown");
    assert_eq!(policy, Policy::default());
    assert_eq!(policy.enforcement_mode, EnforcementMode::Advisory);
}

#[test]
fn test_repo_then_org_then_default() {
    let registry = PolicyRegistry::default();
    registry.register("acme", Policy::with_mode(EnforcementMode::Warning));
    registry.register("acme/payments", Policy::with_mode(EnforcementMode::Blocking));

    assert_eq!(
        registry.resolve("acme/payments").enforcement_mode,
        EnforcementMode::Blocking
    );
    assert_eq!(
        registry.resolve("acme/web").enforcement_mode,
        EnforcementMode::Warning
    );
    assert_eq!(
        registry.resolve("other/web").enforcement_mode,
        EnforcementMode::Advisory
    );
}

#[test]
fn test_reload_replaces_everything() {
    let registry = PolicyRegistry::default();
    registry.register("acme/web", Policy::with_mode(EnforcementMode::Blocking));

    registry.reload(
        Policy::with_mode(EnforcementMode::Warning),
        [("acme/api".to_string(), Policy::with_mode(EnforcementMode::Blocking))],
    );

    assert_eq!(registry.names(), vec!["acme/api".to_string()]);
    assert_eq!(
        registry.resolve("acme/web").enforcement_mode,
        EnforcementMode::Warning
    );
}

#[test]
fn test_resolve_never_sees_half_applied_reload() {
    let strict = Policy {
        block_on_high: true,
        ..Policy::with_mode(EnforcementMode::Blocking)
    };
    let relaxed = Policy {
        block_on_high: false,
        ..Policy::with_mode(EnforcementMode::Warning)
    };
    let registry = PolicyRegistry::new(relaxed.clone());

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for i in 0..200 {
                if i % 2 == 0 {
                    registry.reload(relaxed.clone(), [("acme".to_string(), strict.clone())]);
                } else {
                    registry.reload(strict.clone(), Vec::new());
                    registry.register("acme/web", relaxed.clone());
                }
            }
        });
        for _ in 0..3 {
            scope.spawn(|| {
                for _ in 0..200 {
                    let policy = registry.resolve("acme/web");
                    assert!(
                        policy == strict || policy == relaxed,
                        "torn policy: {policy:?}"
                    );
                }
            });
        }
    });

    assert_eq!(registry.resolve("acme/web"), relaxed);
    assert_eq!(registry.resolve("acme/api"), strict);
}

#[test]
fn test_policy_parses_with_defaults() {
    let policy: Policy = serde_yaml::from_str(
        "enforcement_mode: blocking\nblock_on_high: true\ndisabled_rules: [SEC-005]\n",
    )
    .unwrap();

    assert_eq!(policy.enforcement_mode, EnforcementMode::Blocking);
    assert!(policy.block_on_critical);
    assert!(policy.block_on_high);
    assert!(policy.disabled_rules.contains("SEC-005"));
    assert_eq!(policy.enabled_categories.len(), Category::ALL.len());
}

#[test]
fn test_policy_validate_rejects_bad_glob() {
    let policy = Policy {
        exclude_paths: vec!["src/[".to_string()],
        ..Policy::default()
    };
    assert!(policy.validate("acme").is_err());
}

#[test]
fn test_allows_license_is_case_insensitive() {
    let policy = Policy::default();
    assert!(policy.allows_license("gpl-3.0"));
    assert!(!policy.allows_license("AGPL-3.0"));
}

// ============================================================================
// Tokens
// ============================================================================

#[test]
fn test_token_valid_before_expiry() {
    let store = TokenStore::default();
    let now = fixed_now();
    let token = store.create_at("acme/web", "hotfix", now);

    assert_eq!(token.expires_at - token.issued_at, Duration::hours(24));
    assert_eq!(token.hint().len(), 8);

    let valid = store
        .validate_at(&token.token, "acme/web", now + Duration::hours(23))
        .unwrap();
    assert_eq!(valid.reason, "hotfix");
}

#[test]
fn test_token_rejections() {
    let store = TokenStore::new(1);
    let now = fixed_now();
    let token = store.create_at("acme/web", "hotfix", now);

    assert_eq!(
        store.validate_at("nope", "acme/web", now),
        Err(OverrideRejection::NotFound)
    );
    assert_eq!(
        store.validate_at(&token.token, "acme/api", now),
        Err(OverrideRejection::RepoMismatch)
    );
    assert_eq!(
        store.validate_at(&token.token, "acme/web", now + Duration::hours(1)),
        Err(OverrideRejection::Expired)
    );
}

#[test]
fn test_expired_tokens_purged_on_create() {
    let store = TokenStore::new(1);
    let now = fixed_now();
    let old = store.create_at("acme/web", "old", now);

    store.create_at("acme/web", "new", now + Duration::hours(2));

    assert_eq!(store.len(), 1);
    assert_eq!(
        store.validate_at(&old.token, "acme/web", now + Duration::hours(2)),
        Err(OverrideRejection::NotFound)
    );
}

#[test]
fn test_token_is_reusable_until_expiry() {
    let store = TokenStore::default();
    let now = fixed_now();
    let token = store.create_at("acme/web", "hotfix", now);

    assert!(store.validate_at(&token.token, "acme/web", now).is_ok());
    assert!(store.validate_at(&token.token, "acme/web", now).is_ok());
}

// ============================================================================
// Enforcement
// ============================================================================

#[test]
fn test_advisory_never_blocks() {
    let engine = PolicyEngine::default();
    let outcome = engine.enforce(&violations(5, Severity::Critical), "acme/web", None);

    assert!(!outcome.decision.should_block);
    assert_eq!(outcome.decision.action, Action::AdvisoryReport);
    assert_eq!(outcome.decision.critical_count, 5);
}

#[test]
fn test_unregistered_repo_with_high_violations_is_advisory() {
    let engine = PolicyEngine::default();
    let decision = engine
        .enforce(&violations(5, Severity::High), "acme/unregistered", None)
        .decision;

    assert_eq!(decision.enforcement_mode, EnforcementMode::Advisory);
    assert!(!decision.should_block);
    assert_eq!(decision.high_count, 5);
}

#[test]
fn test_warning_mode_warns_or_passes() {
    let engine = PolicyEngine::default();
    engine
        .registry()
        .register("acme/web", Policy::with_mode(EnforcementMode::Warning));

    let warned = engine.enforce(&violations(1, Severity::Critical), "acme/web", None);
    assert!(!warned.decision.should_block);
    assert_eq!(warned.decision.action, Action::Warned);

    let passed = engine.enforce(&[], "acme/web", None);
    assert_eq!(passed.decision.action, Action::Passed);
}

#[test]
fn test_blocking_on_critical() {
    let engine = blocking_engine("acme/web");
    let decision = engine
        .enforce(&violations(2, Severity::Critical), "acme/web", None)
        .decision;

    assert!(decision.should_block);
    assert_eq!(decision.action, Action::Blocked);
    assert_eq!(
        decision.reason.as_deref(),
        Some("Blocking due to 2 critical violation(s)")
    );
}

#[test]
fn test_blocking_ignores_high_unless_configured() {
    let engine = blocking_engine("acme/web");
    let decision = engine
        .enforce(&violations(3, Severity::High), "acme/web", None)
        .decision;
    assert!(!decision.should_block);
    assert_eq!(decision.action, Action::Warned);

    engine.registry().register(
        "acme/web",
        Policy {
            block_on_high: true,
            ..Policy::with_mode(EnforcementMode::Blocking)
        },
    );
    let decision = engine
        .enforce(&violations(3, Severity::High), "acme/web", None)
        .decision;
    assert!(decision.should_block);
}

#[test]
fn test_blocking_license_violation_blocks() {
    let engine = blocking_engine("acme/web");
    engine.registry().register(
        "acme/web",
        Policy {
            block_on_critical: false,
            ..Policy::with_mode(EnforcementMode::Blocking)
        },
    );

    let decision = engine
        .enforce(
            &[violation("LICENSE-001", Category::License, Severity::High)],
            "acme/web",
            None,
        )
        .decision;
    assert!(decision.should_block);
    assert_eq!(decision.license_blocking_count, 1);

    let low_license = engine
        .enforce(
            &[violation("IP-004", Category::License, Severity::Low)],
            "acme/web",
            None,
        )
        .decision;
    assert!(!low_license.should_block);
}

#[test]
fn test_disabled_category_is_filtered() {
    let engine = PolicyEngine::default();
    let mut policy = Policy::with_mode(EnforcementMode::Blocking);
    policy.enabled_categories.remove(&Category::Security);
    engine.registry().register("acme/web", policy);

    let decision = engine
        .enforce(&violations(2, Severity::Critical), "acme/web", None)
        .decision;

    assert!(!decision.should_block);
    assert_eq!(decision.violation_count, 0);
    assert_eq!(decision.filtered_count, 2);
    assert_eq!(decision.action, Action::Passed);
}

#[test]
fn test_valid_override_unblocks() {
    let engine = blocking_engine("acme/web");
    let now = fixed_now();
    let token = engine.create_override_token_at("acme/web", "release", now);

    let outcome = engine.enforce_at(
        &violations(1, Severity::Critical),
        "acme/web",
        Some(&token.token),
        now + Duration::minutes(5),
    );

    assert!(!outcome.decision.should_block);
    assert!(outcome.decision.override_applied);
    assert_eq!(outcome.decision.action, Action::OverrideApplied);
    assert_eq!(outcome.applied_token, Some(token));
}

#[test]
fn test_expired_override_never_unblocks() {
    let engine = blocking_engine("acme/web");
    let now = fixed_now();
    let token = engine.create_override_token_at("acme/web", "release", now);

    let outcome = engine.enforce_at(
        &violations(1, Severity::Critical),
        "acme/web",
        Some(&token.token),
        now + Duration::hours(25),
    );

    assert!(outcome.decision.should_block);
    assert!(!outcome.decision.override_applied);
    assert_eq!(
        outcome.decision.override_rejected,
        Some(OverrideRejection::Expired)
    );
    assert!(outcome.applied_token.is_none());
}

#[test]
fn test_override_for_other_repo_rejected() {
    let engine = blocking_engine("acme/web");
    let token = engine.create_override_token("acme/api", "release");

    let decision = engine
        .enforce(
            &violations(1, Severity::Critical),
            "acme/web",
            Some(&token.token),
        )
        .decision;
    assert!(decision.should_block);
    assert_eq!(
        decision.override_rejected,
        Some(OverrideRejection::RepoMismatch)
    );
}

#[test]
fn test_token_not_consulted_when_not_blocking() {
    let engine = blocking_engine("acme/web");
    let decision = engine
        .enforce(&violations(1, Severity::Low), "acme/web", Some("bogus"))
        .decision;

    assert!(!decision.should_block);
    assert!(decision.override_rejected.is_none());
    assert_eq!(decision.action, Action::Warned);
}

#[test]
fn test_enforce_is_idempotent() {
    let engine = blocking_engine("acme/web");
    let input = violations(3, Severity::Critical);
    let first = engine.enforce(&input, "acme/web", None).decision;
    let second = engine.enforce(&input, "acme/web", None).decision;
    assert_eq!(first, second);
}

#[test]
fn test_decision_serializes_snake_case() {
    let engine = blocking_engine("acme/web");
    let decision = engine
        .enforce(&violations(1, Severity::Critical), "acme/web", Some("bogus"))
        .decision;
    let json = serde_json::to_value(&decision).unwrap();

    assert_eq!(json["action"], "blocked");
    assert_eq!(json["enforcement_mode"], "blocking");
    assert_eq!(json["override_rejected"], "not_found");
}
