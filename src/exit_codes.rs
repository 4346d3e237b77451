//! Exit code constants for the guardrails CLI.
//!
//! - 0: Success (scan completed, merge allowed)
//! - 1: User error (bad args, invalid config or rule definitions)
//! - 2: Merge blocked by policy
//! - 3: Audit record could not be persisted

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unreadable input, invalid config or rule.
pub const USER_ERROR: i32 = 1;

/// The enforcement decision blocks the merge.
pub const BLOCKED: i32 = 2;

/// The audit trail could not be written.
pub const AUDIT_FAILURE: i32 = 3;
