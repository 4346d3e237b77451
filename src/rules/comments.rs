//! Best-effort single-line comment stripping per language family.
//!
//! Rules match only the code portion of a line so that prose in comments is
//! never reported. Quotes are tracked so comment tokens inside string
//! literals (`"http://..."`, `'#fff'`) do not truncate the line.

use std::borrow::Cow;

/// Comment syntax for one language family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentSyntax {
    /// Tokens that start a comment running to end of line.
    markers: &'static [&'static str],
    /// Block comment delimiters; a closed block hides only its own span.
    block: Option<(&'static str, &'static str)>,
    /// Characters that open and close string literals.
    quotes: &'static [char],
}

const C_BLOCK: Option<(&str, &str)> = Some(("/*", "*/"));

const HASH: CommentSyntax = CommentSyntax {
    markers: &["#"],
    block: None,
    quotes: &['"', '\''],
};

const SLASH: CommentSyntax = CommentSyntax {
    markers: &["//"],
    block: C_BLOCK,
    quotes: &['"', '\'', '`'],
};

// `'` starts lifetimes and labels in Rust, not only char literals.
const RUST: CommentSyntax = CommentSyntax {
    markers: &["//"],
    block: C_BLOCK,
    quotes: &['"'],
};

const PHP: CommentSyntax = CommentSyntax {
    markers: &["//", "#"],
    block: C_BLOCK,
    quotes: &['"', '\''],
};

const DASH: CommentSyntax = CommentSyntax {
    markers: &["--"],
    block: None,
    quotes: &['\''],
};

const NONE: CommentSyntax = CommentSyntax {
    markers: &[],
    block: None,
    quotes: &[],
};

impl CommentSyntax {
    /// Pick the comment syntax for a file from its extension.
    pub fn for_path(file_path: &str) -> Self {
        let ext = match file_path.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => return NONE,
        };

        match ext.as_str() {
            "py" | "rb" | "sh" | "bash" | "pl" | "r" => HASH,
            "rs" => RUST,
            "php" => PHP,
            "sql" => DASH,
            "js" | "ts" | "tsx" | "jsx" | "java" | "cs" | "c" | "h" | "cpp" | "hpp" | "cc"
            | "go" | "scala" | "kt" | "swift" => SLASH,
            _ => NONE,
        }
    }

    /// Return the code portion of `line`.
    ///
    /// A line comment drops the rest of the line. A block comment closed on
    /// the same line is replaced by a single space and scanning resumes after
    /// it; an unclosed one drops the rest of the line.
    pub fn strip<'a>(&self, line: &'a str) -> Cow<'a, str> {
        if self.markers.is_empty() && self.block.is_none() {
            return Cow::Borrowed(line);
        }

        // Code collected before the last closed block comment, if any.
        let mut kept: Option<String> = None;
        let mut segment_start = 0;
        let mut in_quote: Option<char> = None;
        let mut escaped = false;
        let mut idx = 0;

        while let Some(ch) = line[idx..].chars().next() {
            let next = idx + ch.len_utf8();

            if let Some(quote) = in_quote {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == quote {
                    in_quote = None;
                }
                idx = next;
                continue;
            }

            if self.quotes.contains(&ch) {
                in_quote = Some(ch);
                idx = next;
                continue;
            }

            let rest = &line[idx..];
            if let Some((open, close)) = self.block
                && rest.starts_with(open)
            {
                let Some(end) = rest[open.len()..].find(close) else {
                    return finish(kept, &line[segment_start..idx]);
                };
                let buf = kept.get_or_insert_with(String::new);
                buf.push_str(&line[segment_start..idx]);
                buf.push(' ');
                idx += open.len() + end + close.len();
                segment_start = idx;
                continue;
            }

            if self.markers.iter().any(|m| rest.starts_with(m)) {
                return finish(kept, &line[segment_start..idx]);
            }

            idx = next;
        }

        finish(kept, &line[segment_start..])
    }
}

fn finish<'a>(kept: Option<String>, tail: &'a str) -> Cow<'a, str> {
    match kept {
        Some(mut buf) => {
            buf.push_str(tail);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(tail),
    }
}
