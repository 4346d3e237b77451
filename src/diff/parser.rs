//! Core diff parsing logic.

use tracing::debug;

use super::api::{AddedLine, ParsedFile};
use super::helpers::{is_binary_marker, looks_like_diff, parse_hunk_header};

/// Remaining line counts of the hunk being read.
///
/// `None` means the header was malformed and the hunk runs until the next
/// header.
type Remaining = Option<(usize, usize)>;

/// Tracks new-file numbering and guarantees strictly increasing output.
struct LineSink {
    file_path: String,
    lines: Vec<AddedLine>,
    next_line: usize,
    last_emitted: usize,
}

impl LineSink {
    fn new(file_path: &str) -> Self {
        Self {
            file_path: file_path.to_string(),
            lines: Vec::new(),
            next_line: 1,
            last_emitted: 0,
        }
    }

    fn push(&mut self, content: &str) {
        let line_number = self.next_line.max(self.last_emitted + 1);
        if line_number != self.next_line {
            debug!(
                file = %self.file_path,
                declared = self.next_line,
                assigned = line_number,
                "clamping overlapping hunk line number"
            );
        }
        self.lines.push(AddedLine {
            file_path: self.file_path.clone(),
            line_number,
            content: content.to_string(),
        });
        self.last_emitted = line_number;
        self.next_line = line_number + 1;
    }

    fn skip_context(&mut self) {
        self.next_line += 1;
    }
}

/// Parse added lines from a single file's patch text.
///
/// This is the core parsing function; see [`super::parse_file_diff`].
pub(super) fn parse_added_lines(file_path: &str, diff_text: &str) -> ParsedFile {
    let mut parsed = ParsedFile {
        file_path: file_path.to_string(),
        ..Default::default()
    };

    if diff_text.trim().is_empty() {
        return parsed;
    }

    if !looks_like_diff(diff_text) {
        parsed.lines = if is_headerless_hunk(diff_text) {
            debug!(file = %file_path, "diff has no hunk header, numbering sequentially");
            parse_hunk_body(file_path, diff_text)
        } else {
            raw_content_lines(file_path, diff_text)
        };
        return parsed;
    }

    let mut sink = LineSink::new(file_path);
    let mut in_hunk = false;
    let mut remaining: Remaining = None;

    for line in diff_text.lines() {
        if !in_hunk && is_binary_marker(line) {
            debug!(file = %file_path, "skipping binary patch");
            return ParsedFile {
                file_path: file_path.to_string(),
                binary: true,
                ..Default::default()
            };
        }

        if line.starts_with("@@") {
            match parse_hunk_header(line) {
                Some(header) => {
                    debug!(
                        file = %file_path,
                        old_start = header.old_start,
                        new_start = header.new_start,
                        "hunk"
                    );
                    sink.next_line = header.new_start;
                    remaining = Some((header.old_len, header.new_len));
                    in_hunk = header.old_len > 0 || header.new_len > 0;
                }
                None => {
                    debug!(file = %file_path, header = line, "malformed hunk header");
                    parsed.malformed_hunks += 1;
                    sink.next_line = sink.last_emitted + 1;
                    remaining = None;
                    in_hunk = true;
                }
            }
            continue;
        }

        if !in_hunk {
            // File headers: diff --git, index, ---, +++, mode lines
            continue;
        }

        if line.starts_with("diff --git ") {
            in_hunk = false;
            continue;
        }

        if line.starts_with('\\') {
            // "\ No newline at end of file"
            continue;
        }

        if let Some(content) = line.strip_prefix('+') {
            sink.push(content);
            remaining = remaining.map(|(old, new)| (old, new.saturating_sub(1)));
        } else if line.starts_with('-') {
            remaining = remaining.map(|(old, new)| (old.saturating_sub(1), new));
        } else if line.starts_with(' ') || line.is_empty() {
            sink.skip_context();
            remaining = remaining.map(|(old, new)| (old.saturating_sub(1), new.saturating_sub(1)));
        }

        if remaining == Some((0, 0)) {
            in_hunk = false;
        }
    }

    parsed.lines = sink.lines;
    parsed
}

/// Whether headerless text looks like a hunk body (`+`/`-`/` ` prefixed lines).
fn is_headerless_hunk(text: &str) -> bool {
    let mut saw_added = false;
    for line in text.lines().filter(|l| !l.is_empty()) {
        match line.as_bytes()[0] {
            b'+' => saw_added = true,
            b'-' | b' ' | b'\\' => {}
            _ => return false,
        }
    }
    saw_added
}

/// Number a headerless hunk body from line 1.
fn parse_hunk_body(file_path: &str, text: &str) -> Vec<AddedLine> {
    let mut sink = LineSink::new(file_path);
    for line in text.lines() {
        if let Some(content) = line.strip_prefix('+') {
            sink.push(content);
        } else if line.starts_with(' ') || line.is_empty() {
            sink.skip_context();
        }
    }
    sink.lines
}

/// Treat raw content as a newly added file.
fn raw_content_lines(file_path: &str, text: &str) -> Vec<AddedLine> {
    text.lines()
        .enumerate()
        .map(|(idx, content)| AddedLine {
            file_path: file_path.to_string(),
            line_number: idx + 1,
            content: content.to_string(),
        })
        .collect()
}
