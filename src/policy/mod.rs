//! Policies, override tokens and enforcement decisions.
//!
//! The registry and the token store are the stateful parts; evaluation of a
//! violation list against a resolved policy is a pure function.

mod engine;
mod registry;
mod tokens;
mod types;

#[cfg(test)]
mod tests;

pub use engine::{Enforcement, PolicyEngine, evaluate};
pub use registry::PolicyRegistry;
pub use tokens::{DEFAULT_TOKEN_TTL_HOURS, OverrideToken, TokenStore, token_hint};
pub use types::{
    Action, EnforcementDecision, EnforcementMode, OverrideRejection, Policy,
    default_allowed_licenses,
};
