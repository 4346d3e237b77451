//! Tests for the rule engine.

use super::*;
use crate::diff::parse_file_diff;
use crate::policy::{EnforcementMode, Policy};
use crate::test_support::{files, new_file_diff};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

fn extensions() -> Vec<String> {
    ["py", "js", "ts", "rs", "sql"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn engine() -> RuleEngine {
    RuleEngine::with_builtin_rules(&extensions(), 200).unwrap()
}

fn scan_files(
    engine: &RuleEngine,
    input: &BTreeMap<String, String>,
    copilot_generated_files: &BTreeSet<String>,
    policy: &Policy,
) -> Vec<Violation> {
    let (selected, _) = engine.select_files(input, policy);
    let mut violations: Vec<Violation> = selected
        .iter()
        .flat_map(|parsed| {
            let copilot = copilot_generated_files.contains(&parsed.file_path);
            engine.scan_file(parsed, copilot, policy)
        })
        .collect();
    sort_violations(&mut violations);
    violations
}

fn scan(engine: &RuleEngine, path: &str, lines: &[&str]) -> Vec<Violation> {
    scan_files(engine, &files(path, lines), &BTreeSet::new(), &Policy::default())
}

struct ContainsPlugin {
    id: &'static str,
    needle: &'static str,
}

impl RulePlugin for ContainsPlugin {
    fn id(&self) -> &str {
        self.id
    }
    fn name(&self) -> &str {
        "contains"
    }
    fn category(&self) -> Category {
        Category::CodeQuality
    }
    fn severity(&self) -> Severity {
        Severity::Low
    }
    fn check(&self, line: &str, _file_path: &str) -> anyhow::Result<Option<String>> {
        Ok(line.contains(self.needle).then(|| format!("found {}", self.needle)))
    }
}

struct FailingPlugin;

impl RulePlugin for FailingPlugin {
    fn id(&self) -> &str {
        "FAIL-001"
    }
    fn name(&self) -> &str {
        "failing"
    }
    fn category(&self) -> Category {
        Category::CodeQuality
    }
    fn severity(&self) -> Severity {
        Severity::Low
    }
    fn check(&self, line: &str, _file_path: &str) -> anyhow::Result<Option<String>> {
        if line.contains("boom") {
            anyhow::bail!("matcher exploded");
        }
        Ok(None)
    }
}

struct PanickingPlugin;

impl RulePlugin for PanickingPlugin {
    fn id(&self) -> &str {
        "PANIC-001"
    }
    fn name(&self) -> &str {
        "panicking"
    }
    fn category(&self) -> Category {
        Category::CodeQuality
    }
    fn severity(&self) -> Severity {
        Severity::Low
    }
    fn check(&self, _line: &str, _file_path: &str) -> anyhow::Result<Option<String>> {
        panic!("plugin bug");
    }
}

// ============================================================================
// Core matching
// ============================================================================

#[test]
fn test_hardcoded_api_key_single_violation() {
    let violations = scan(&engine(), "app.py", &[r#"api_key = "sk-1234567890""#]);

    assert_eq!(violations.len(), 1);
    let v = &violations[0];
    assert_eq!(v.rule_id, "SEC-001");
    assert_eq!(v.category, Category::Security);
    assert_eq!(v.severity, Severity::Critical);
    assert_eq!(v.line_number, 1);
    assert_eq!(v.cwe_id.as_deref(), Some("CWE-798"));
    assert_eq!(v.source, RuleSource::BuiltIn);
    assert!(v.message.starts_with("Hardcoded API Key"));
}

#[test]
fn test_commented_out_secret_is_ignored() {
    let violations = scan(&engine(), "app.py", &[r#"# api_key = "sk-1234567890""#]);
    assert!(violations.is_empty());
}

#[test]
fn test_trailing_comment_does_not_hide_code() {
    let violations = scan(
        &engine(),
        "app.py",
        &[r#"api_key = "sk-1234567890"  # rotate me"#],
    );
    assert_eq!(violations.len(), 1);
}

#[test]
fn test_closed_block_comment_does_not_hide_code() {
    let engine = engine();
    let plain = scan(&engine, "web/app.js", &["eval(userInput);"]);
    let prefixed = scan(&engine, "web/app.js", &["/**/ eval(userInput);"]);
    let inline = scan(&engine, "web/app.js", &["let x = 1; /* note */ eval(userInput);"]);

    assert_eq!(plain.len(), 1);
    assert_eq!(prefixed, plain);
    assert_eq!(inline.len(), 1);
    assert_eq!(inline[0].rule_id, "SEC-004");
    assert!(scan(&engine, "web/app.js", &["/* eval(userInput); */"]).is_empty());
}

#[test]
fn test_comment_rules_see_comment_only_lines() {
    let engine = engine();
    let input = files(
        "gen.py",
        &["import os  # noqa", "# TODO: CRITICAL auth check", "x = 1"],
    );

    let copilot = BTreeSet::from(["gen.py".to_string()]);
    let generated = scan_files(&engine, &input, &copilot, &Policy::default());
    let hits: Vec<(&str, usize)> = generated
        .iter()
        .map(|v| (v.rule_id.as_str(), v.line_number))
        .collect();
    assert_eq!(hits, vec![("AI-002", 1), ("AI-001", 2)]);

    let human = scan_files(&engine, &input, &BTreeSet::new(), &Policy::default());
    assert!(human.is_empty());
}

#[test]
fn test_zero_added_lines_zero_violations() {
    let engine = engine();
    let diff = "@@ -1,2 +1,1 @@\n-api_key = \"old\"\n context\n";
    let input = BTreeMap::from([("app.py".to_string(), diff.to_string())]);
    assert!(scan_files(&engine, &input, &BTreeSet::new(), &Policy::default()).is_empty());
}

#[test]
fn test_line_can_trigger_multiple_rules_but_each_once() {
    let violations = scan(
        &engine(),
        "app.py",
        &[r#"password = "x"; token = "y"; eval(code)"#],
    );

    let ids: Vec<&str> = violations.iter().map(|v| v.rule_id.as_str()).collect();
    assert_eq!(ids, vec!["SEC-001", "SEC-004"]);
}

#[test]
fn test_output_sorted_by_file_line_rule() {
    let engine = engine();
    let mut input = files("b.py", &["eval(x)", r#"password = "p""#]);
    input.extend(files("a.py", &["x = 1", "os.system(cmd)"]));

    let violations = scan_files(&engine, &input, &BTreeSet::new(), &Policy::default());
    let keys: Vec<(&str, usize)> = violations
        .iter()
        .map(|v| (v.file_path.as_str(), v.line_number))
        .collect();
    assert_eq!(keys, vec![("a.py", 2), ("b.py", 1), ("b.py", 2)]);
}

#[test]
fn test_scan_is_idempotent() {
    let engine = engine();
    let input = files("app.py", &[r#"api_key = "k""#, "pickle.loads(blob)"]);
    let first = scan_files(&engine, &input, &BTreeSet::new(), &Policy::default());
    let second = scan_files(&engine, &input, &BTreeSet::new(), &Policy::default());
    assert_eq!(first, second);
}

#[test]
fn test_snippet_is_trimmed_and_bounded() {
    let engine = RuleEngine::with_builtin_rules(&extensions(), 10).unwrap();
    let violations = scan(&engine, "app.py", &[r#"    password = "hunter2hunter2""#]);
    assert_eq!(violations[0].line_content, "password =");
}

#[test]
fn test_bounded_snippet_respects_char_boundaries() {
    assert_eq!(bounded_snippet("  héllo wörld  ", 4), "héll");
    assert_eq!(bounded_snippet("short", 200), "short");
}

// ============================================================================
// File filtering
// ============================================================================

#[test]
fn test_should_scan_file() {
    let engine = engine();
    assert!(engine.should_scan_file("src/app.py"));
    assert!(engine.should_scan_file("src/App.PY"));
    assert!(!engine.should_scan_file("README.md"));
    assert!(!engine.should_scan_file("Makefile"));
    assert!(!engine.should_scan_file(".py"));
    assert!(!engine.should_scan_file("dir/.py"));
}

#[test]
fn test_unlisted_extension_skipped() {
    let violations = scan(&engine(), "notes.md", &[r#"api_key = "sk-1234567890""#]);
    assert!(violations.is_empty());
}

#[test]
fn test_excluded_paths_skipped() {
    let engine = engine();
    let policy = Policy {
        exclude_paths: vec!["tests/**".to_string()],
        ..Policy::default()
    };
    let input = files("tests/fixtures.py", &[r#"password = "fixture""#]);
    assert!(scan_files(&engine, &input, &BTreeSet::new(), &policy).is_empty());
}

#[test]
fn test_binary_file_yields_nothing() {
    let engine = engine();
    let input = BTreeMap::from([(
        "blob.py".to_string(),
        "Binary files a/blob.py and b/blob.py differ\n".to_string(),
    )]);
    assert!(scan_files(&engine, &input, &BTreeSet::new(), &Policy::default()).is_empty());
}

#[test]
fn test_select_files_counts_skipped() {
    let engine = engine();
    let policy = Policy {
        exclude_paths: vec!["vendor/**".to_string()],
        ..Policy::default()
    };
    let mut input = files("src/b.py", &["x = 1"]);
    input.extend(files("src/a.py", &["y = 2"]));
    input.extend(files("README.md", &["# docs"]));
    input.extend(files("vendor/lib.py", &["z = 3"]));
    input.insert(
        "img.js".to_string(),
        "Binary files a/img.js and b/img.js differ\n".to_string(),
    );

    let (selected, skipped) = engine.select_files(&input, &policy);
    let paths: Vec<&str> = selected.iter().map(|p| p.file_path.as_str()).collect();
    assert_eq!(paths, vec!["src/a.py", "src/b.py"]);
    assert_eq!(skipped, 3);
}

// ============================================================================
// Policy interaction
// ============================================================================

#[test]
fn test_disabled_category_not_evaluated() {
    let engine = engine();
    let mut policy = Policy::default();
    policy.enabled_categories.remove(&Category::Security);

    let input = files("app.py", &[r#"api_key = "k""#]);
    assert!(scan_files(&engine, &input, &BTreeSet::new(), &policy).is_empty());
}

#[test]
fn test_disabled_rule_not_evaluated() {
    let engine = engine();
    let policy = Policy {
        disabled_rules: BTreeSet::from(["SEC-001".to_string()]),
        ..Policy::default()
    };
    let input = files("app.py", &[r#"api_key = "k""#, "eval(x)"]);
    let violations = scan_files(&engine, &input, &BTreeSet::new(), &policy);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].rule_id, "SEC-004");
}

#[test]
fn test_copilot_flag_and_copilot_only_rules() {
    let engine = engine();
    let input = files("gen.py", &["def handler(event): pass", r#"token = "t""#]);

    let human = scan_files(&engine, &input, &BTreeSet::new(), &Policy::default());
    assert_eq!(human.len(), 1);
    assert!(!human[0].is_copilot_generated);

    let copilot = BTreeSet::from(["gen.py".to_string()]);
    let generated = scan_files(&engine, &input, &copilot, &Policy::default());
    let ids: Vec<&str> = generated.iter().map(|v| v.rule_id.as_str()).collect();
    assert_eq!(ids, vec!["AI-001", "SEC-001"]);
    assert!(generated.iter().all(|v| v.is_copilot_generated));
}

// ============================================================================
// Severity precedence
// ============================================================================

#[test]
fn test_pack_override_raises_builtin_severity() {
    let mut engine = engine();
    engine
        .register_compliance_pack(&CompliancePack::builtin("banking").unwrap())
        .unwrap();

    let violations = scan(&engine, "app.py", &["digest = hashlib.md5(data)"]);
    assert_eq!(violations[0].rule_id, "SEC-005");
    assert_eq!(violations[0].severity, Severity::Critical);
}

#[test]
fn test_policy_override_beats_pack_override() {
    let mut engine = engine();
    engine
        .register_compliance_pack(&CompliancePack::builtin("banking").unwrap())
        .unwrap();
    let policy = Policy {
        severity_overrides: BTreeMap::from([("SEC-005".to_string(), Severity::Low)]),
        ..Policy::default()
    };

    let input = files("app.py", &["digest = hashlib.md5(data)"]);
    let violations = scan_files(&engine, &input, &BTreeSet::new(), &policy);
    assert_eq!(violations[0].severity, Severity::Low);
}

#[test]
fn test_highest_pack_override_wins() {
    let mut engine = engine();
    let mut low = CompliancePack::builtin("telecom").unwrap();
    low.severity_overrides
        .insert("SEC-004".to_string(), Severity::Medium);
    let mut high = CompliancePack::builtin("government").unwrap();
    high.severity_overrides
        .insert("SEC-004".to_string(), Severity::High);
    engine.register_compliance_pack(&high).unwrap();
    engine.register_compliance_pack(&low).unwrap();

    let rule = engine.rule("SEC-004").unwrap();
    assert_eq!(
        engine.effective_severity(rule, &Policy::default()),
        Severity::High
    );
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_pack_rules_fire_with_pack_source() {
    let mut engine = engine();
    engine
        .register_compliance_pack(&CompliancePack::builtin("healthcare").unwrap())
        .unwrap();

    let violations = scan(&engine, "views.py", &["@csrf_exempt"]);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].rule_id, "HIPAA-002");
    assert_eq!(
        violations[0].source,
        RuleSource::Pack {
            name: "healthcare".to_string(),
            version: "1.0.0".to_string()
        }
    );
}

#[test]
fn test_registering_pack_twice_replaces_it() {
    let mut engine = engine();
    let pack = CompliancePack::builtin("telecom").unwrap();
    let before = engine.rules().len();

    engine.register_compliance_pack(&pack).unwrap();
    engine.register_compliance_pack(&pack).unwrap();

    assert_eq!(engine.rules().len(), before + pack.rules.len());
    assert_eq!(engine.packs().count(), 1);
}

#[test]
fn test_pack_cannot_shadow_builtin_rule() {
    let mut engine = engine();
    let mut pack = CompliancePack::builtin("telecom").unwrap();
    pack.rules.push(
        RuleDefinition::new("SEC-001", "shadow", Category::Security, Severity::Low)
            .pattern("x", "x"),
    );
    let before = engine.rules().len();

    assert!(engine.register_compliance_pack(&pack).is_err());
    assert_eq!(engine.rules().len(), before);
    assert_eq!(engine.packs().count(), 0);
}

#[test]
fn test_invalid_regex_rejected_at_registration() {
    let mut engine = engine();
    let def = RuleDefinition::new("BAD-001", "bad", Category::Security, Severity::Low)
        .pattern("(unclosed", "bad");
    let err = engine
        .register_definition(&def, RuleSource::BuiltIn)
        .unwrap_err();
    assert!(err.to_string().contains("BAD-001"));
}

#[test]
fn test_duplicate_rule_id_rejected() {
    let mut engine = engine();
    let err = engine
        .register_plugin(Arc::new(ContainsPlugin {
            id: "SEC-001",
            needle: "x",
        }))
        .unwrap_err();
    assert!(err.to_string().contains("already registered"));
}

#[test]
fn test_path_restricted_rule() {
    let mut engine = engine();
    let mut def = RuleDefinition::new("MIG-001", "raw drop", Category::CodeQuality, Severity::Medium)
        .pattern(r"drop\s+table", "Destructive migration");
    def.paths = vec!["migrations/**".to_string()];
    engine.register_definition(&def, RuleSource::BuiltIn).unwrap();

    assert_eq!(scan(&engine, "migrations/001.sql", &["DROP TABLE users;"]).len(), 1);
    assert!(scan(&engine, "scripts/reset.sql", &["DROP TABLE users;"]).is_empty());
}

// ============================================================================
// Plugins
// ============================================================================

#[test]
fn test_plugin_violation_carries_plugin_source() {
    let mut engine = engine();
    engine
        .register_plugin(Arc::new(ContainsPlugin {
            id: "ACME-001",
            needle: "dbg!(",
        }))
        .unwrap();

    let violations = scan(&engine, "lib.rs", &["let y = dbg!(x);"]);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].rule_id, "ACME-001");
    assert_eq!(violations[0].message, "found dbg!(");
    assert_eq!(
        violations[0].source,
        RuleSource::Plugin {
            name: "contains".to_string()
        }
    );
}

#[test]
fn test_failing_plugin_is_isolated() {
    let mut engine = engine();
    engine.register_plugin(Arc::new(FailingPlugin)).unwrap();

    let violations = scan(&engine, "app.py", &[r#"boom = eval(x)"#]);
    let ids: Vec<&str> = violations.iter().map(|v| v.rule_id.as_str()).collect();
    assert_eq!(ids, vec!["SEC-004"]);
}

#[test]
fn test_panicking_plugin_is_isolated() {
    let mut engine = engine();
    engine.register_plugin(Arc::new(PanickingPlugin)).unwrap();

    let violations = scan(&engine, "app.py", &[r#"password = "p""#, "eval(x)"]);
    assert_eq!(violations.len(), 2);
    assert!(violations.iter().all(|v| v.rule_id != "PANIC-001"));
}

// ============================================================================
// scan_file and summaries
// ============================================================================

#[test]
fn test_scan_file_uses_new_file_line_numbers() {
    let engine = engine();
    let diff = "@@ -10,2 +10,3 @@\n context\n+password = \"p\"\n context\n";
    let parsed = parse_file_diff("app.py", diff);
    let violations = engine.scan_file(&parsed, false, &Policy::with_mode(EnforcementMode::Blocking));
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].line_number, 11);
}

#[test]
fn test_summary_counts() {
    let engine = engine();
    let input = files(
        "app.py",
        &[r#"api_key = "k""#, "pickle.loads(b)", "x = 1", "eval(y)"],
    );
    let violations = scan_files(&engine, &input, &BTreeSet::new(), &Policy::default());
    let summary = ScanSummary::new(violations, 1, 0);

    assert_eq!(summary.violation_count, 3);
    assert_eq!(summary.critical_count, 2);
    assert_eq!(summary.high_count, 1);
    assert!(summary.critical_count + summary.high_count <= summary.violation_count);
    assert_eq!(summary.scan_id.len(), 36);
}

#[test]
fn test_new_file_diff_helper_round_trip() {
    let parsed = parse_file_diff("a.py", &new_file_diff(&["a", "b"]));
    assert_eq!(parsed.lines.len(), 2);
}
