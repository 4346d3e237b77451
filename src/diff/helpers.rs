//! Helper functions for diff parsing.

/// Ranges declared by a hunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct HunkHeader {
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
}

/// Parse the file path from a "diff --git" line.
///
/// Handles various formats:
/// - "a/path/to/file b/path/to/file" (normal)
/// - "a/path/to/file b/path/to/renamed" (rename)
///
/// Returns the "b/" path (new file path), or None if parsing fails.
pub(super) fn parse_diff_git_line(rest: &str) -> Option<String> {
    // Paths can contain spaces, so look for the last " b/" separator
    if let Some(b_pos) = rest.rfind(" b/") {
        let b_path = &rest[b_pos + 3..];
        return Some(normalize_path(b_path));
    }

    let parts: Vec<&str> = rest.split_whitespace().collect();
    if parts.len() >= 2 {
        let b_part = parts[parts.len() - 1];
        if let Some(path) = b_part.strip_prefix("b/") {
            return Some(normalize_path(path));
        }
    }

    None
}

/// Parse a hunk header line.
///
/// Format: "@@ -old_start,old_len +new_start,new_len @@" or "@@ -old_start +new_start @@"
/// Also handles: "@@ -old_start,old_len +new_start,new_len @@ context info"
///
/// An omitted length means 1, as in unified diff output.
pub(super) fn parse_hunk_header(line: &str) -> Option<HunkHeader> {
    let line = line.strip_prefix("@@ ")?;

    let end_marker = line.find(" @@")?;
    let range_part = &line[..end_marker];

    let parts: Vec<&str> = range_part.split_whitespace().collect();
    if parts.len() != 2 {
        return None;
    }

    let (old_start, old_len) = parse_range(parts[0].strip_prefix('-')?)?;
    let (new_start, new_len) = parse_range(parts[1].strip_prefix('+')?)?;

    Some(HunkHeader {
        old_start,
        old_len,
        new_start,
        new_len,
    })
}

/// Parse "start" or "start,len".
fn parse_range(range: &str) -> Option<(usize, usize)> {
    match range.split_once(',') {
        Some((start, len)) => Some((start.parse().ok()?, len.parse().ok()?)),
        None => Some((range.parse().ok()?, 1)),
    }
}

/// Whether a line marks the patch as binary.
pub(super) fn is_binary_marker(line: &str) -> bool {
    (line.starts_with("Binary files ") && line.ends_with(" differ"))
        || line.starts_with("GIT binary patch")
}

/// Whether text is diff syntax rather than raw file content.
///
/// A lone `--- ` or `+++ ` line is ordinary content; file headers only count
/// as a `--- ` line directly followed by a `+++ ` line.
pub(super) fn looks_like_diff(text: &str) -> bool {
    let mut after_old_header = false;
    for line in text.lines() {
        if line.starts_with("@@ ")
            || line.starts_with("diff --git ")
            || is_binary_marker(line)
            || (after_old_header && line.starts_with("+++ "))
        {
            return true;
        }
        after_old_header = line.starts_with("--- ");
    }
    false
}

/// Normalize a file path to use forward slashes.
pub(super) fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
