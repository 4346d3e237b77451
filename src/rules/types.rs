//! Core types shared by every rule source: severities, categories and the
//! violations they produce.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a violation. Totally ordered: `Info < Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Parse a severity from its lowercase name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Some(Self::Info),
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category a rule reports under. Policies enable or disable whole categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Security,
    Compliance,
    License,
    Performance,
    AiRisk,
    CodeQuality,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 6] = [
        Category::Security,
        Category::Compliance,
        Category::License,
        Category::Performance,
        Category::AiRisk,
        Category::CodeQuality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Security => "security",
            Category::Compliance => "compliance",
            Category::License => "license",
            Category::Performance => "performance",
            Category::AiRisk => "ai-risk",
            Category::CodeQuality => "code-quality",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a rule came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleSource {
    /// Shipped with guardrails.
    BuiltIn,
    /// Part of a named, versioned compliance pack.
    Pack { name: String, version: String },
    /// Registered at runtime through [`super::RulePlugin`].
    Plugin { name: String },
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSource::BuiltIn => write!(f, "built-in"),
            RuleSource::Pack { name, version } => write!(f, "pack:{}@{}", name, version),
            RuleSource::Plugin { name } => write!(f, "plugin:{}", name),
        }
    }
}

/// A single rule match against one changed line or file.
///
/// Violations are immutable once produced and scoped to one scan. The only
/// field filled after the fact is `suggested_fix`, owned by the optional
/// suggestion collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub rule_id: String,
    pub rule_name: String,
    pub category: Category,
    pub severity: Severity,
    pub message: String,
    /// Repository-relative file path (forward slashes).
    pub file_path: String,
    /// Line number in the new file (1-based).
    pub line_number: usize,
    /// Trimmed, length-bounded copy of the offending line.
    pub line_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwe_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owasp_category: Option<String>,
    #[serde(default)]
    pub is_copilot_generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
    pub source: RuleSource,
}

impl Violation {
    /// Whether this violation counts as a blocking license violation.
    pub fn is_blocking_license(&self) -> bool {
        self.category == Category::License && self.severity >= Severity::High
    }
}

/// Truncate a line to at most `max_chars` characters after trimming.
pub fn bounded_snippet(line: &str, max_chars: usize) -> String {
    let trimmed = line.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => trimmed[..idx].to_string(),
        None => trimmed.to_string(),
    }
}
