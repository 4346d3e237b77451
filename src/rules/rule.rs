//! Rule definitions and the compiled rules the engine evaluates.
//!
//! Built-in rules and compliance-pack rules are plain data
//! ([`RuleDefinition`]); plugins are trait objects. Both compile into the
//! same [`Rule`], which exposes one capability set: metadata plus a pure
//! line matcher.

use crate::error::{GuardError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use super::plugin::RulePlugin;
use super::types::{Category, RuleSource, Severity};

/// One regex of a pattern rule and the label reported when it matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDefinition {
    pub pattern: String,
    pub label: String,
}

/// Declarative definition of a pattern rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub severity: Severity,
    /// Appended to the matched label in the violation message.
    #[serde(default)]
    pub message: String,
    pub patterns: Vec<PatternDefinition>,
    #[serde(default = "default_true")]
    pub case_insensitive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwe_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owasp_category: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Only evaluate on files declared as AI-generated.
    #[serde(default)]
    pub copilot_only: bool,
    /// Match against the whole added line, comments included.
    #[serde(default)]
    pub include_comments: bool,
    /// Restrict the rule to matching paths (empty means every path).
    #[serde(default)]
    pub paths: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl RuleDefinition {
    /// Start a definition with the required metadata.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        severity: Severity,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            severity,
            message: String::new(),
            patterns: Vec::new(),
            case_insensitive: true,
            cwe_id: None,
            owasp_category: None,
            enabled: true,
            copilot_only: false,
            include_comments: false,
            paths: Vec::new(),
        }
    }

    pub fn pattern(mut self, pattern: impl Into<String>, label: impl Into<String>) -> Self {
        self.patterns.push(PatternDefinition {
            pattern: pattern.into(),
            label: label.into(),
        });
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn cwe(mut self, cwe_id: impl Into<String>) -> Self {
        self.cwe_id = Some(cwe_id.into());
        self
    }

    pub fn owasp(mut self, owasp_category: impl Into<String>) -> Self {
        self.owasp_category = Some(owasp_category.into());
        self
    }

    pub fn copilot_only(mut self) -> Self {
        self.copilot_only = true;
        self
    }

    pub fn include_comments(mut self) -> Self {
        self.include_comments = true;
        self
    }
}

/// Outcome of evaluating one rule against one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    NoMatch,
    /// The rule fired; carries the label of what matched.
    Matched(String),
    /// The matcher failed; the rule is skipped for this line.
    Failed(String),
}

/// How a rule decides whether a line matches.
#[derive(Clone)]
pub enum RuleMatcher {
    /// Data-defined rule: first matching regex wins.
    Patterns(Vec<(Regex, String)>),
    /// Runtime-registered plugin.
    Plugin(Arc<dyn RulePlugin>),
}

impl std::fmt::Debug for RuleMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleMatcher::Patterns(patterns) => f
                .debug_tuple("Patterns")
                .field(&patterns.iter().map(|(re, _)| re.as_str()).collect::<Vec<_>>())
                .finish(),
            RuleMatcher::Plugin(plugin) => f.debug_tuple("Plugin").field(&plugin.id()).finish(),
        }
    }
}

/// A compiled rule, read-only during scans.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub severity: Severity,
    pub message: String,
    pub cwe_id: Option<String>,
    pub owasp_category: Option<String>,
    pub enabled: bool,
    pub copilot_only: bool,
    /// Sees the raw line instead of its code portion.
    pub include_comments: bool,
    pub source: RuleSource,
    paths: Option<GlobSet>,
    matcher: RuleMatcher,
}

impl Rule {
    /// Compile a declarative definition.
    ///
    /// # Returns
    ///
    /// * `Ok(Rule)` - Compiled rule
    /// * `Err(GuardError::InvalidRule)` - Empty id, no patterns, bad regex or bad glob
    pub fn from_definition(def: &RuleDefinition, source: RuleSource) -> Result<Self> {
        if def.id.trim().is_empty() {
            return Err(GuardError::InvalidRule("rule id must not be empty".to_string()));
        }
        if def.patterns.is_empty() {
            return Err(GuardError::InvalidRule(format!(
                "rule '{}' defines no patterns",
                def.id
            )));
        }

        let mut patterns = Vec::with_capacity(def.patterns.len());
        for p in &def.patterns {
            let regex = RegexBuilder::new(&p.pattern)
                .case_insensitive(def.case_insensitive)
                .build()
                .map_err(|e| {
                    GuardError::InvalidRule(format!(
                        "invalid regex pattern in rule '{}': '{}' - {}",
                        def.id, p.pattern, e
                    ))
                })?;
            patterns.push((regex, p.label.clone()));
        }

        Ok(Self {
            id: def.id.clone(),
            name: def.name.clone(),
            category: def.category,
            severity: def.severity,
            message: def.message.clone(),
            cwe_id: def.cwe_id.clone(),
            owasp_category: def.owasp_category.clone(),
            enabled: def.enabled,
            copilot_only: def.copilot_only,
            include_comments: def.include_comments,
            source,
            paths: build_path_globs(&def.id, &def.paths)?,
            matcher: RuleMatcher::Patterns(patterns),
        })
    }

    /// Wrap a plugin as a rule.
    pub fn from_plugin(plugin: Arc<dyn RulePlugin>) -> Result<Self> {
        let id = plugin.id().to_string();
        if id.trim().is_empty() {
            return Err(GuardError::InvalidRule(
                "plugin rule id must not be empty".to_string(),
            ));
        }

        Ok(Self {
            name: plugin.name().to_string(),
            category: plugin.category(),
            severity: plugin.severity(),
            message: String::new(),
            cwe_id: plugin.cwe_id().map(str::to_string),
            owasp_category: plugin.owasp_category().map(str::to_string),
            enabled: true,
            copilot_only: false,
            include_comments: false,
            source: RuleSource::Plugin {
                name: plugin.name().to_string(),
            },
            paths: None,
            id,
            matcher: RuleMatcher::Plugin(plugin),
        })
    }

    /// Whether the rule applies to a file at all.
    pub fn applies_to(&self, file_path: &str) -> bool {
        let path_ok = self.paths.as_ref().is_none_or(|g| g.is_match(file_path));
        match &self.matcher {
            RuleMatcher::Plugin(plugin) => path_ok && plugin.applies_to(file_path),
            RuleMatcher::Patterns(_) => path_ok,
        }
    }

    /// Evaluate the rule against one line (its code portion unless
    /// `include_comments` is set).
    ///
    /// Plugin errors and panics are contained and reported as
    /// [`MatchOutcome::Failed`].
    pub fn evaluate(&self, code: &str, file_path: &str) -> MatchOutcome {
        match &self.matcher {
            RuleMatcher::Patterns(patterns) => patterns
                .iter()
                .find(|(regex, _)| regex.is_match(code))
                .map(|(_, label)| MatchOutcome::Matched(label.clone()))
                .unwrap_or(MatchOutcome::NoMatch),
            RuleMatcher::Plugin(plugin) => {
                match catch_unwind(AssertUnwindSafe(|| plugin.check(code, file_path))) {
                    Ok(Ok(Some(label))) => MatchOutcome::Matched(label),
                    Ok(Ok(None)) => MatchOutcome::NoMatch,
                    Ok(Err(e)) => MatchOutcome::Failed(format!("{:#}", e)),
                    Err(_) => MatchOutcome::Failed("matcher panicked".to_string()),
                }
            }
        }
    }

    /// Message reported for a match with the given label.
    pub fn describe(&self, label: &str) -> String {
        if self.message.is_empty() {
            label.to_string()
        } else {
            format!("{}. {}", label, self.message)
        }
    }
}

fn build_path_globs(rule_id: &str, patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(&pattern.replace('\\', "/")).map_err(|e| {
            GuardError::InvalidRule(format!(
                "invalid path glob in rule '{}': '{}' - {}",
                rule_id, pattern, e
            ))
        })?;
        builder.add(glob);
    }

    builder.build().map(Some).map_err(|e| {
        GuardError::InvalidRule(format!("failed to compile path globs for '{}': {}", rule_id, e))
    })
}
