//! Policies keyed by repository or organization.

use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

use super::types::Policy;

#[derive(Debug, Default)]
struct Policies {
    by_name: HashMap<String, Policy>,
    default: Policy,
}

/// Policy lookup with repository -> organization -> default fallback.
///
/// Reads clone the resolved policy so no lock is held while a scan runs.
#[derive(Debug, Default)]
pub struct PolicyRegistry {
    inner: RwLock<Policies>,
}

impl PolicyRegistry {
    pub fn new(default: Policy) -> Self {
        Self {
            inner: RwLock::new(Policies {
                by_name: HashMap::new(),
                default,
            }),
        }
    }

    /// Register or replace the policy for a repository (`org/repo`) or an
    /// organization (`org`).
    pub fn register(&self, name: &str, policy: Policy) {
        let mut inner = self.inner.write().unwrap_or_else(|poison| poison.into_inner());
        debug!(name = %name, mode = %policy.enforcement_mode, "registered policy");
        inner.by_name.insert(name.to_string(), policy);
    }

    /// Resolve the policy that applies to a repository.
    pub fn resolve(&self, repo_name: &str) -> Policy {
        let inner = self.inner.read().unwrap_or_else(|poison| poison.into_inner());
        if let Some(policy) = inner.by_name.get(repo_name) {
            return policy.clone();
        }

        if let Some((org, _)) = repo_name.split_once('/')
            && let Some(policy) = inner.by_name.get(org)
        {
            return policy.clone();
        }

        inner.default.clone()
    }

    /// Replace every registered policy and the default in one step.
    pub fn reload(&self, default: Policy, policies: impl IntoIterator<Item = (String, Policy)>) {
        let by_name: HashMap<String, Policy> = policies.into_iter().collect();
        let mut inner = self.inner.write().unwrap_or_else(|poison| poison.into_inner());
        debug!(policies = by_name.len(), "reloaded policies");
        *inner = Policies { by_name, default };
    }

    /// Names with an explicit policy, sorted.
    pub fn names(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(|poison| poison.into_inner());
        let mut names: Vec<String> = inner.by_name.keys().cloned().collect();
        names.sort();
        names
    }
}
