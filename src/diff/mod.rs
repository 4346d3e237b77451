//! Diff parsing primitives for guardrails.
//!
//! Converts the per-file patches attached to a review into the ordered list
//! of added lines the rule engine and license checker consume.
//!
//! The parsing is deterministic and fail-soft:
//! - Proper hunk header parsing for accurate new-file line numbers
//! - Malformed hunk headers fall back to sequential numbering
//! - Binary patches are skipped, not rejected
//! - Raw file content (no diff markers) is treated as a new file
//! - Line numbers are strictly increasing per file

mod api;
mod helpers;
mod parser;


// Re-export public API
pub use api::{AddedLine, ParsedFile, chunk_files, parse_file_diff, split_unified_diff};
