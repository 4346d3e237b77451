//! Public API for diff parsing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::helpers::{normalize_path, parse_diff_git_line};
use super::parser::parse_added_lines;

/// Represents a single added line from a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedLine {
    /// Repository-relative file path (forward slashes).
    pub file_path: String,
    /// Line number in the new file (1-based).
    pub line_number: usize,
    /// The content of the added line (without leading '+').
    pub content: String,
}

/// The scannable view of one file's patch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedFile {
    /// Repository-relative file path (forward slashes).
    pub file_path: String,
    /// Added lines in new-file order.
    pub lines: Vec<AddedLine>,
    /// The patch is a binary patch; `lines` is always empty.
    pub binary: bool,
    /// Number of hunk headers that could not be parsed.
    pub malformed_hunks: usize,
}

impl ParsedFile {
    /// Whether the file contributes nothing to scan.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Parse one file's diff (or raw content) into its added lines.
///
/// Never fails: malformed input degrades to best-effort numbering.
///
/// # Arguments
///
/// * `file_path` - Path the patch belongs to (normalized to forward slashes)
/// * `diff_text` - Unified diff for that file, or its raw content
///
/// # Example
///
/// ```
/// use guardrails::diff::parse_file_diff;
///
/// let parsed = parse_file_diff("src/app.py", "@@ -1,0 +4,1 @@\n+token = 'x'\n");
/// assert_eq!(parsed.lines[0].line_number, 4);
/// ```
pub fn parse_file_diff(file_path: &str, diff_text: &str) -> ParsedFile {
    parse_added_lines(&normalize_path(file_path), diff_text)
}

/// Split a multi-file unified diff into per-file patches.
///
/// Sections start at `diff --git` lines, or at a `---`/`+++` header pair for
/// plain unified diffs. The path comes from the `+++ b/...` header when
/// present. Deleted files (`+++ /dev/null`) are dropped since they add no
/// lines.
pub fn split_unified_diff(diff_output: &str) -> BTreeMap<String, String> {
    let mut files = BTreeMap::new();
    let mut current_path: Option<String> = None;
    let mut current_body = String::new();
    let mut deleted = false;
    let mut seen_hunk = false;

    let lines: Vec<&str> = diff_output.lines().collect();
    for (idx, line) in lines.iter().enumerate() {
        let next = lines.get(idx + 1).copied().unwrap_or_default();
        let starts_git_section = line.starts_with("diff --git ");
        let starts_plain_section = line.starts_with("--- ")
            && next.starts_with("+++ ")
            && (seen_hunk || current_path.is_none());

        if starts_git_section || starts_plain_section {
            flush_section(&mut files, current_path.take(), &current_body, deleted);
            current_body.clear();
            deleted = false;
            seen_hunk = false;
            if let Some(rest) = line.strip_prefix("diff --git ") {
                current_path = parse_diff_git_line(rest);
            }
        }

        if let Some(rest) = line.strip_prefix("+++ ")
            && !seen_hunk
        {
            let rest = rest.trim_end();
            if rest == "/dev/null" {
                deleted = true;
            } else {
                let path = rest.strip_prefix("b/").unwrap_or(rest);
                current_path = Some(normalize_path(path));
            }
        }

        if line.starts_with("@@") {
            seen_hunk = true;
        }

        current_body.push_str(line);
        current_body.push('\n');
    }

    flush_section(&mut files, current_path, &current_body, deleted);
    files
}

fn flush_section(
    files: &mut BTreeMap<String, String>,
    path: Option<String>,
    body: &str,
    deleted: bool,
) {
    if let Some(path) = path
        && !deleted
    {
        files.insert(path, body.to_string());
    }
}

/// Group per-file patches into batches for scanning large pull requests.
///
/// Files stay whole and keep path order. A batch closes as soon as its
/// patches exceed `max_bytes`, so a single oversized file forms its own
/// batch. Never yields an empty batch.
pub fn chunk_files(
    files: &BTreeMap<String, String>,
    max_bytes: usize,
) -> Vec<BTreeMap<String, String>> {
    let mut chunks = Vec::new();
    let mut current = BTreeMap::new();
    let mut current_size = 0;

    for (path, patch) in files {
        current.insert(path.clone(), patch.clone());
        current_size += patch.len();
        if current_size > max_bytes {
            chunks.push(std::mem::take(&mut current));
            current_size = 0;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
