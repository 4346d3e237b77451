//! Time-bounded override tokens.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::types::OverrideRejection;

/// Default lifetime of an override token.
pub const DEFAULT_TOKEN_TTL_HOURS: u32 = 24;

/// Characters of a token safe to show in logs and audit records.
const TOKEN_HINT_CHARS: usize = 8;

/// An issued override credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideToken {
    pub token: String,
    pub repo_name: String,
    pub reason: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OverrideToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// The first characters of the token, never the full credential.
    pub fn hint(&self) -> String {
        token_hint(&self.token)
    }
}

/// Truncate a token to its loggable prefix.
pub fn token_hint(token: &str) -> String {
    token.chars().take(TOKEN_HINT_CHARS).collect()
}

/// Issued tokens, keyed by token string.
///
/// Lookup and expiry check happen under one lock, so a token can never be
/// observed valid after its expiry.
#[derive(Debug)]
pub struct TokenStore {
    ttl: Duration,
    tokens: Mutex<HashMap<String, OverrideToken>>,
}

impl TokenStore {
    pub fn new(ttl_hours: u32) -> Self {
        Self {
            ttl: Duration::hours(i64::from(ttl_hours)),
            tokens: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for a repository.
    pub fn create(&self, repo_name: &str, reason: &str) -> OverrideToken {
        self.create_at(repo_name, reason, Utc::now())
    }

    /// Issue a token as of `now`, purging tokens already expired.
    pub fn create_at(&self, repo_name: &str, reason: &str, now: DateTime<Utc>) -> OverrideToken {
        let token = OverrideToken {
            token: Uuid::new_v4().simple().to_string(),
            repo_name: repo_name.to_string(),
            reason: reason.to_string(),
            issued_at: now,
            expires_at: now + self.ttl,
        };

        let mut tokens = self.tokens.lock().unwrap_or_else(|poison| poison.into_inner());
        tokens.retain(|_, t| !t.is_expired_at(now));
        tokens.insert(token.token.clone(), token.clone());
        token
    }

    /// Check a presented token for a repository.
    pub fn validate(&self, token: &str, repo_name: &str) -> Result<OverrideToken, OverrideRejection> {
        self.validate_at(token, repo_name, Utc::now())
    }

    pub fn validate_at(
        &self,
        token: &str,
        repo_name: &str,
        now: DateTime<Utc>,
    ) -> Result<OverrideToken, OverrideRejection> {
        let tokens = self.tokens.lock().unwrap_or_else(|poison| poison.into_inner());
        let issued = tokens.get(token).ok_or(OverrideRejection::NotFound)?;

        if issued.is_expired_at(now) {
            return Err(OverrideRejection::Expired);
        }
        if issued.repo_name != repo_name {
            return Err(OverrideRejection::RepoMismatch);
        }

        Ok(issued.clone())
    }

    /// Drop expired tokens. Returns how many were removed.
    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut tokens = self.tokens.lock().unwrap_or_else(|poison| poison.into_inner());
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_expired_at(now));
        before - tokens.len()
    }

    pub fn len(&self) -> usize {
        self.tokens
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_TTL_HOURS)
    }
}
