//! Extension point for rules implemented in code.

use super::types::{Category, Severity};

/// A line-level rule supplied at runtime.
///
/// Implementations must be pure: the same line and path always produce the
/// same answer. A returned error (or a panic) skips this rule for the line
/// being checked; the scan continues.
///
/// ```
/// use guardrails::rules::{Category, RulePlugin, Severity};
///
/// struct NoPrintDebug;
///
/// impl RulePlugin for NoPrintDebug {
///     fn id(&self) -> &str { "ACME-001" }
///     fn name(&self) -> &str { "No debug printing" }
///     fn category(&self) -> Category { Category::CodeQuality }
///     fn severity(&self) -> Severity { Severity::Low }
///     fn check(&self, line: &str, _file_path: &str) -> anyhow::Result<Option<String>> {
///         Ok(line.contains("dbg!(").then(|| "dbg! left in code".to_string()))
///     }
/// }
/// ```
pub trait RulePlugin: Send + Sync {
    /// Unique rule id.
    fn id(&self) -> &str;

    /// Human-readable rule name.
    fn name(&self) -> &str;

    fn category(&self) -> Category;

    fn severity(&self) -> Severity;

    fn cwe_id(&self) -> Option<&str> {
        None
    }

    fn owasp_category(&self) -> Option<&str> {
        None
    }

    /// Whether the plugin wants to see lines of this file.
    fn applies_to(&self, _file_path: &str) -> bool {
        true
    }

    /// Check the code portion of one added line.
    ///
    /// Returns the label of what matched, or `None`.
    fn check(&self, line: &str, file_path: &str) -> anyhow::Result<Option<String>>;
}
