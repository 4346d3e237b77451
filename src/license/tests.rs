//! Tests for license classification and the file checker.

use super::*;
use crate::diff::parse_file_diff;
use crate::policy::Policy;
use crate::rules::{Category, Severity, Violation};
use crate::test_support::new_file_diff;

fn check(lines: &[&str]) -> Vec<Violation> {
    check_with(lines, &Policy::default())
}

fn check_with(lines: &[&str], policy: &Policy) -> Vec<Violation> {
    let parsed = parse_file_diff("src/vendor.py", &new_file_diff(lines));
    LicenseChecker::new(200).check_file(&parsed, false, policy)
}

fn ids(violations: &[Violation]) -> Vec<&str> {
    violations.iter().map(|v| v.rule_id.as_str()).collect()
}

#[test]
fn test_classify_sets() {
    assert_eq!(classify("mit"), LicenseClass::Permissive);
    assert_eq!(classify("Apache-2.0"), LicenseClass::Permissive);
    assert_eq!(classify("GPL-2.0-only"), LicenseClass::Restrictive);
    assert_eq!(classify("AGPL-3.0"), LicenseClass::Restrictive);
    assert_eq!(classify("Proprietary"), LicenseClass::Incompatible);
    assert_eq!(classify("WTFPL"), LicenseClass::Unknown);
}

#[test]
fn test_split_expression() {
    assert_eq!(split_expression("MIT OR Apache-2.0"), vec!["MIT", "Apache-2.0"]);
    assert_eq!(
        split_expression("(GPL-2.0+ WITH Classpath-exception-2.0) AND BSD-3-Clause"),
        vec!["GPL-2.0", "BSD-3-Clause"]
    );
}

#[test]
fn test_detect_licenses() {
    assert_eq!(
        detect_licenses("# SPDX-License-Identifier: MIT OR Apache-2.0"),
        vec!["MIT", "Apache-2.0"]
    );
    assert_eq!(detect_licenses("// License: AGPL-3.0"), vec!["AGPL-3.0"]);
    assert_eq!(
        detect_licenses(" * Licensed under the GNU General Public License v3"),
        vec!["GPL-3.0"]
    );
    assert_eq!(detect_licenses("# MIT License"), vec!["MIT"]);
    assert!(detect_licenses("admit = submit(form)").is_empty());
}

#[test]
fn test_permissive_license_is_clean() {
    assert!(check(&["# SPDX-License-Identifier: MIT", "x = 1"]).is_empty());
}

#[test]
fn test_allowed_restrictive_license_is_clean() {
    assert!(check(&["# SPDX-License-Identifier: GPL-3.0"]).is_empty());
}

#[test]
fn test_restrictive_license_not_allowed() {
    let violations = check(&["x = 1", "# SPDX-License-Identifier: AGPL-3.0"]);

    assert_eq!(ids(&violations), vec!["LICENSE-001"]);
    let v = &violations[0];
    assert_eq!(v.category, Category::License);
    assert_eq!(v.severity, Severity::High);
    assert_eq!(v.line_number, 2);
    assert_eq!(v.cwe_id.as_deref(), Some("CWE-1104"));
    assert!(v.is_blocking_license());
}

#[test]
fn test_one_license_violation_per_file_lists_all() {
    let violations = check(&[
        "# SPDX-License-Identifier: AGPL-3.0",
        "# License: Proprietary",
        "# License: WTFPL",
    ]);

    assert_eq!(ids(&violations), vec!["LICENSE-001"]);
    let message = &violations[0].message;
    assert!(message.contains("'AGPL-3.0'"));
    assert!(message.contains("'Proprietary'"));
    assert!(message.contains("'WTFPL'"));
    assert_eq!(violations[0].line_number, 1);
}

#[test]
fn test_policy_allow_list_is_respected() {
    let policy = Policy {
        allowed_licenses: vec!["AGPL-3.0".to_string()],
        ..Policy::default()
    };
    assert!(check_with(&["# SPDX-License-Identifier: AGPL-3.0"], &policy).is_empty());

    let strict = Policy {
        allowed_licenses: Vec::new(),
        ..Policy::default()
    };
    assert_eq!(
        ids(&check_with(&["# SPDX-License-Identifier: GPL-3.0"], &strict)),
        vec!["LICENSE-001"]
    );
}

#[test]
fn test_copied_marker_is_medium() {
    let violations = check(&["# This is copied from stackoverflow", "x = 1"]);
    assert_eq!(ids(&violations), vec!["IP-001"]);
    assert_eq!(violations[0].severity, Severity::Medium);
}

#[test]
fn test_attribution_is_info() {
    let violations = check(&["# Source: https://example.com/snippet"]);
    assert_eq!(ids(&violations), vec!["IP-001"]);
    assert_eq!(violations[0].severity, Severity::Info);
}

#[test]
fn test_copied_marker_after_attribution_raises_severity() {
    let violations = check(&["# Based on the reference parser", "# copied from vendor/lib.py"]);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].severity, Severity::Medium);
    assert_eq!(violations[0].line_number, 1);
}

#[test]
fn test_placeholder_import_and_boilerplate() {
    let violations = check(&[
        "from some_library import helper",
        "def run():",
        "    # TODO: replace with real implementation",
        "    # Add your logic here",
    ]);
    assert_eq!(ids(&violations), vec!["IP-002", "IP-003"]);
    assert_eq!(violations[1].line_number, 3);
}

#[test]
fn test_copyright_notice_is_low() {
    let violations = check(&["/* Copyright 2015-2020 Initech */"]);
    assert_eq!(ids(&violations), vec!["IP-004"]);
    assert_eq!(violations[0].severity, Severity::Low);
    assert!(!violations[0].is_blocking_license());
}

#[test]
fn test_disabled_license_category_skips_checker() {
    let mut policy = Policy::default();
    policy.enabled_categories.remove(&Category::License);
    assert!(check_with(&["# SPDX-License-Identifier: AGPL-3.0"], &policy).is_empty());
}

#[test]
fn test_policy_severity_override_applies() {
    let mut policy = Policy::default();
    policy
        .severity_overrides
        .insert("IP-004".to_string(), Severity::Info);
    let violations = check_with(&["# Copyright (c) 2021 Acme"], &policy);
    assert_eq!(violations[0].severity, Severity::Info);
}
