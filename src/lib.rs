//! Guardrails: policy-driven violation detection for code review diffs.
//!
//! A review takes the per-file unified diffs of a pull request, scans the
//! added lines for security, AI-pattern and license/IP findings, applies the
//! repository's enforcement policy (with optional time-limited override
//! tokens) and appends the outcome to an append-only audit log.
//!
//! [`Guard`] owns one instance of every component and is the usual entry
//! point:
//!
//! ```
//! use guardrails::config::Config;
//! use guardrails::guard::{Guard, ReviewRequest};
//!
//! let guard = Guard::from_config(&Config::default()).unwrap();
//! let mut request = ReviewRequest {
//!     repo_name: "acme/web".to_string(),
//!     pr_number: 7,
//!     commit_hash: "abc123".to_string(),
//!     ..ReviewRequest::default()
//! };
//! request.files.insert(
//!     "app.py".to_string(),
//!     "@@ -0,0 +1 @@\n+password = \"hunter2hunter2\"\n".to_string(),
//! );
//!
//! let review = guard.review(&request, None);
//! assert_eq!(review.summary.violation_count, 1);
//! assert!(!review.decision.should_block);
//! ```

pub mod audit;
pub mod config;
pub mod diff;
pub mod error;
pub mod exit_codes;
pub mod guard;
pub mod license;
pub mod logging;
pub mod policy;
pub mod rules;

#[cfg(test)]
mod test_support;

pub use guard::Guard;
