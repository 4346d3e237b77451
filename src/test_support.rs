use crate::rules::{Category, RuleSource, Severity, Violation};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;

/// A violation with only the fields enforcement cares about filled in.
pub(crate) fn violation(rule_id: &str, category: Category, severity: Severity) -> Violation {
    Violation {
        rule_id: rule_id.to_string(),
        rule_name: format!("{} test rule", rule_id),
        category,
        severity,
        message: "test violation".to_string(),
        file_path: "src/app.py".to_string(),
        line_number: 1,
        line_content: "x = 1".to_string(),
        cwe_id: None,
        owasp_category: None,
        is_copilot_generated: false,
        suggested_fix: None,
        source: RuleSource::BuiltIn,
    }
}

/// `count` violations of one severity in the security category.
pub(crate) fn violations(count: usize, severity: Severity) -> Vec<Violation> {
    (0..count)
        .map(|i| {
            let mut v = violation("SEC-001", Category::Security, severity);
            v.line_number = i + 1;
            v
        })
        .collect()
}

/// A new-file diff adding `lines` from line 1.
pub(crate) fn new_file_diff(lines: &[&str]) -> String {
    let mut diff = format!("@@ -0,0 +1,{} @@\n", lines.len());
    for line in lines {
        diff.push('+');
        diff.push_str(line);
        diff.push('\n');
    }
    diff
}

/// A single-file diff map.
pub(crate) fn files(path: &str, lines: &[&str]) -> BTreeMap<String, String> {
    BTreeMap::from([(path.to_string(), new_file_diff(lines))])
}

/// Fixed instant used by time-dependent tests.
pub(crate) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
}
