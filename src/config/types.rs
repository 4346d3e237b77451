//! Configuration constants and default value functions.

use crate::policy::DEFAULT_TOKEN_TTL_HOURS;

/// File name looked up when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "guardrails.yaml";

/// Default characters kept from an offending line.
pub const DEFAULT_MAX_SNIPPET_CHARS: usize = 200;

pub fn default_scan_extensions() -> Vec<String> {
    [
        "py", "js", "ts", "tsx", "jsx", "java", "cs", "cpp", "c", "h", "hpp", "go", "rb", "php",
        "sql", "scala", "kt", "rs",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn default_override_token_ttl_hours() -> u32 {
    DEFAULT_TOKEN_TTL_HOURS
}

pub fn default_max_snippet_chars() -> usize {
    DEFAULT_MAX_SNIPPET_CHARS
}
