//! The rule registry and line scanner.

use crate::config::Config;
use crate::diff::{ParsedFile, parse_file_diff};
use crate::error::{GuardError, Result};
use crate::policy::Policy;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, warn};

use super::builtin::builtin_definitions;
use super::comments::CommentSyntax;
use super::packs::CompliancePack;
use super::plugin::RulePlugin;
use super::rule::{MatchOutcome, Rule, RuleDefinition};
use super::types::{RuleSource, Severity, Violation, bounded_snippet};

/// Severity overrides contributed by one registered pack.
#[derive(Debug, Clone)]
struct PackEntry {
    version: String,
    overrides: BTreeMap<String, Severity>,
}

/// Registry of every rule source plus the file allow-list.
///
/// Build once at startup; registration takes `&mut self`, scanning takes
/// `&self` and is pure with respect to the registry.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<Rule>,
    packs: BTreeMap<String, PackEntry>,
    /// Normalized extensions to scan (lowercase, no leading dots).
    extensions: Vec<String>,
    max_snippet_chars: usize,
}

impl RuleEngine {
    /// Create an engine with no rules.
    pub fn new(extensions: &[String], max_snippet_chars: usize) -> Self {
        Self {
            rules: Vec::new(),
            packs: BTreeMap::new(),
            extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
            max_snippet_chars,
        }
    }

    /// Create an engine with the built-in catalog registered.
    pub fn with_builtin_rules(extensions: &[String], max_snippet_chars: usize) -> Result<Self> {
        let mut engine = Self::new(extensions, max_snippet_chars);
        for def in builtin_definitions() {
            engine.register_definition(&def, RuleSource::BuiltIn)?;
        }
        Ok(engine)
    }

    /// Build the engine described by a config: built-ins plus the listed packs.
    ///
    /// # Returns
    ///
    /// * `Err(GuardError::Config)` - A listed pack does not exist
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut engine =
            Self::with_builtin_rules(&config.normalized_extensions(), config.max_snippet_chars)?;
        for name in &config.compliance_packs {
            let pack = CompliancePack::builtin(name).ok_or_else(|| {
                GuardError::Config(format!("unknown compliance pack '{}'", name))
            })?;
            engine.register_compliance_pack(&pack)?;
        }
        Ok(engine)
    }

    /// Every registered rule, in registration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Look up a rule by id.
    pub fn rule(&self, rule_id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == rule_id)
    }

    /// Registered packs as `(name, version)`.
    pub fn packs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.packs
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.version.as_str()))
    }

    /// Register a compiled rule. Rule ids are unique across all sources.
    pub fn register_rule(&mut self, rule: Rule) -> Result<()> {
        if self.rule(&rule.id).is_some() {
            return Err(GuardError::InvalidRule(format!(
                "rule id '{}' is already registered",
                rule.id
            )));
        }
        debug!(rule = %rule.id, source = %rule.source, "registered rule");
        self.rules.push(rule);
        Ok(())
    }

    /// Compile and register a declarative rule.
    pub fn register_definition(&mut self, def: &RuleDefinition, source: RuleSource) -> Result<()> {
        let rule = Rule::from_definition(def, source)?;
        self.register_rule(rule)
    }

    /// Register a plugin as a rule.
    pub fn register_plugin(&mut self, plugin: Arc<dyn RulePlugin>) -> Result<()> {
        let rule = Rule::from_plugin(plugin)?;
        self.register_rule(rule)
    }

    /// Register (or replace) a compliance pack.
    ///
    /// All of the pack's rules are compiled before anything is registered, so
    /// a bad pack leaves the registry unchanged.
    pub fn register_compliance_pack(&mut self, pack: &CompliancePack) -> Result<()> {
        let source = RuleSource::Pack {
            name: pack.name.clone(),
            version: pack.version.to_string(),
        };

        let compiled = pack
            .rules
            .iter()
            .map(|def| Rule::from_definition(def, source.clone()))
            .collect::<Result<Vec<_>>>()?;

        let mut seen = BTreeSet::new();
        for rule in &compiled {
            if !seen.insert(rule.id.as_str()) {
                return Err(GuardError::InvalidRule(format!(
                    "pack '{}' defines rule '{}' twice",
                    pack.label(),
                    rule.id
                )));
            }
            if let Some(existing) = self.rule(&rule.id)
                && !is_from_pack(existing, &pack.name)
            {
                return Err(GuardError::InvalidRule(format!(
                    "pack '{}' redefines rule '{}' from {}",
                    pack.label(),
                    rule.id,
                    existing.source
                )));
            }
        }

        self.rules.retain(|r| !is_from_pack(r, &pack.name));
        self.rules.extend(compiled);
        self.packs.insert(
            pack.name.clone(),
            PackEntry {
                version: pack.version.to_string(),
                overrides: pack.severity_overrides.clone(),
            },
        );
        debug!(pack = %pack.label(), rules = pack.rules.len(), "registered compliance pack");
        Ok(())
    }

    /// Check if a file extension is on the scan allow-list.
    pub fn should_scan_file(&self, file_path: &str) -> bool {
        let ext = match file_path.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !stem.ends_with('/') => ext.to_lowercase(),
            _ => return false,
        };

        self.extensions.contains(&ext)
    }

    /// Severity a rule reports with under a policy.
    ///
    /// Precedence: policy override, then pack override (highest wins when
    /// several packs override the same rule), then the rule's own severity.
    pub fn effective_severity(&self, rule: &Rule, policy: &Policy) -> Severity {
        if let Some(severity) = policy.severity_overrides.get(&rule.id) {
            return *severity;
        }

        self.packs
            .values()
            .filter_map(|entry| entry.overrides.get(&rule.id).copied())
            .max()
            .unwrap_or(rule.severity)
    }

    /// Rules that take part in scanning a file under a policy.
    fn active_rules<'a>(
        &'a self,
        file_path: &'a str,
        copilot_generated: bool,
        policy: &'a Policy,
    ) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |rule| {
            rule.enabled
                && policy.category_enabled(rule.category)
                && !policy.disabled_rules.contains(&rule.id)
                && (!rule.copilot_only || copilot_generated)
                && rule.applies_to(file_path)
        })
    }

    /// Evaluate every active rule against the added lines of one file.
    ///
    /// The caller is responsible for the allow-list and exclusion checks.
    pub fn scan_file(
        &self,
        parsed: &ParsedFile,
        copilot_generated: bool,
        policy: &Policy,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();
        let rules: Vec<&Rule> = self
            .active_rules(&parsed.file_path, copilot_generated, policy)
            .collect();
        if rules.is_empty() {
            return violations;
        }

        let syntax = CommentSyntax::for_path(&parsed.file_path);

        for line in &parsed.lines {
            let code = syntax.strip(&line.content);

            for rule in &rules {
                let input: &str = if rule.include_comments {
                    &line.content
                } else {
                    &code
                };
                if input.trim().is_empty() {
                    continue;
                }

                match rule.evaluate(input, &parsed.file_path) {
                    MatchOutcome::NoMatch => {}
                    MatchOutcome::Matched(label) => violations.push(Violation {
                        rule_id: rule.id.clone(),
                        rule_name: rule.name.clone(),
                        category: rule.category,
                        severity: self.effective_severity(rule, policy),
                        message: rule.describe(&label),
                        file_path: line.file_path.clone(),
                        line_number: line.line_number,
                        line_content: bounded_snippet(&line.content, self.max_snippet_chars),
                        cwe_id: rule.cwe_id.clone(),
                        owasp_category: rule.owasp_category.clone(),
                        is_copilot_generated: copilot_generated,
                        suggested_fix: None,
                        source: rule.source.clone(),
                    }),
                    MatchOutcome::Failed(reason) => warn!(
                        rule = %rule.id,
                        file = %line.file_path,
                        line = line.line_number,
                        error = %reason,
                        "rule failed, skipping it for this line"
                    ),
                }
            }
        }

        violations
    }

    /// Parse the files a policy lets through.
    ///
    /// Files off the extension allow-list, matched by the policy's
    /// `exclude_paths`, or binary are skipped. Returns the parsed files in
    /// path order and the number skipped.
    pub fn select_files(
        &self,
        files: &BTreeMap<String, String>,
        policy: &Policy,
    ) -> (Vec<ParsedFile>, usize) {
        let excluded = policy.exclude_globs();
        let mut selected = Vec::new();
        let mut skipped = 0;

        for (path, diff_text) in files {
            if !self.should_scan_file(path) || excluded.is_match(path) {
                debug!(file = %path, "skipping file");
                skipped += 1;
                continue;
            }

            let parsed = parse_file_diff(path, diff_text);
            if parsed.binary {
                debug!(file = %path, "skipping binary file");
                skipped += 1;
                continue;
            }
            selected.push(parsed);
        }

        (selected, skipped)
    }
}

fn is_from_pack(rule: &Rule, pack_name: &str) -> bool {
    matches!(&rule.source, RuleSource::Pack { name, .. } if name == pack_name)
}

/// Sort into the canonical `(file_path, line_number, rule_id)` order.
pub fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| {
        a.file_path
            .cmp(&b.file_path)
            .then(a.line_number.cmp(&b.line_number))
            .then_with(|| a.rule_id.cmp(&b.rule_id))
    });
}
