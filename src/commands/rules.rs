//! Implementation of the `guardrails rules` command.

use crate::cli::RulesArgs;
use guardrails::Guard;
use guardrails::audit::AuditLogger;
use guardrails::config::Config;
use guardrails::error::Result;

/// Print the rule registry and registered compliance packs.
pub fn cmd_rules(config: &Config, args: RulesArgs) -> Result<()> {
    let guard = Guard::new(config, AuditLogger::in_memory())?;
    print!("{}", render_rules(&guard, args.repo.as_deref()));
    Ok(())
}

/// Render one row per rule.
///
/// With a repository, severities are the effective ones under its policy and
/// rules the policy turns off are marked `(disabled)`.
fn render_rules(guard: &Guard, repo_name: Option<&str>) -> String {
    let engine = guard.rules();
    let policy = repo_name.map(|repo| guard.policy_for(repo));

    let mut out = format!(
        "{:<10} {:<9} {:<14} {:<22} {}\n",
        "ID", "SEVERITY", "CATEGORY", "SOURCE", "NAME"
    );

    for rule in engine.rules() {
        let (severity, disabled) = match &policy {
            Some(policy) => (
                engine.effective_severity(rule, policy),
                !rule.enabled
                    || policy.disabled_rules.contains(&rule.id)
                    || !policy.category_enabled(rule.category),
            ),
            None => (rule.severity, !rule.enabled),
        };

        let source = rule.source.to_string();
        out.push_str(&format!(
            "{:<10} {:<9} {:<14} {:<22} {}{}\n",
            rule.id,
            severity.as_str(),
            rule.category.as_str(),
            source,
            rule.name,
            if disabled { " (disabled)" } else { "" }
        ));
    }

    let packs: Vec<String> = engine
        .packs()
        .map(|(name, version)| format!("{} {}", name, version))
        .collect();
    if !packs.is_empty() {
        out.push_str(&format!("\nCompliance packs: {}\n", packs.join(", ")));
    }

    out
}
