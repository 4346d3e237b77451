//! Line-level rules and the engine that evaluates them.
//!
//! Rules come from three sources (the built-in catalog, compliance packs and
//! runtime plugins) and all compile into the same [`Rule`].

mod builtin;
mod comments;
mod engine;
mod packs;
mod plugin;
mod rule;
mod summary;
mod types;

#[cfg(test)]
mod tests;

pub use builtin::builtin_definitions;
pub use comments::CommentSyntax;
pub use engine::{RuleEngine, sort_violations};
pub use packs::{BUILTIN_PACKS, CompliancePack};
pub use plugin::RulePlugin;
pub use rule::{MatchOutcome, PatternDefinition, Rule, RuleDefinition, RuleMatcher};
pub use summary::ScanSummary;
pub use types::{Category, RuleSource, Severity, Violation, bounded_snippet};
