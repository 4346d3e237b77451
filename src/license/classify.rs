//! License identifier classification.

use serde::{Deserialize, Serialize};
use std::fmt;

const PERMISSIVE: &[&str] = &[
    "MIT",
    "Apache-2.0",
    "Apache-2.0-only",
    "BSD-2-Clause",
    "BSD-3-Clause",
    "ISC",
    "MPL-2.0",
    "LGPL-2.1",
    "LGPL-3.0",
];

const RESTRICTIVE: &[&str] = &[
    "GPL-2.0",
    "GPL-2.0-only",
    "GPL-3.0",
    "GPL-3.0-only",
    "AGPL-3.0",
    "AGPL-3.0-only",
];

const INCOMPATIBLE: &[&str] = &["UNKNOWN", "PROPRIETARY", "COMMERCIAL"];

/// Compatibility class of a license identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseClass {
    Permissive,
    /// Copyleft; acceptable only when a policy allows it explicitly.
    Restrictive,
    Incompatible,
    /// Not in any known set.
    Unknown,
}

impl fmt::Display for LicenseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LicenseClass::Permissive => "permissive",
            LicenseClass::Restrictive => "restrictive",
            LicenseClass::Incompatible => "incompatible",
            LicenseClass::Unknown => "unknown",
        })
    }
}

/// Classify an identifier (case-insensitive).
pub fn classify(license: &str) -> LicenseClass {
    let contains = |set: &[&str]| set.iter().any(|known| known.eq_ignore_ascii_case(license));

    if contains(PERMISSIVE) {
        LicenseClass::Permissive
    } else if contains(RESTRICTIVE) {
        LicenseClass::Restrictive
    } else if contains(INCOMPATIBLE) {
        LicenseClass::Incompatible
    } else {
        LicenseClass::Unknown
    }
}

/// Split an SPDX expression such as `(MIT OR Apache-2.0)` into identifiers.
///
/// Operators are dropped, as is the exception id following `WITH`.
pub fn split_expression(expression: &str) -> Vec<String> {
    let mut ids = Vec::new();
    let mut skip_next = false;

    for token in expression
        .split(|c: char| c.is_whitespace() || c == '(' || c == ')')
        .filter(|t| !t.is_empty())
    {
        if skip_next {
            skip_next = false;
            continue;
        }
        match token.to_ascii_uppercase().as_str() {
            "OR" | "AND" => {}
            "WITH" => skip_next = true,
            _ => ids.push(token.trim_end_matches('+').to_string()),
        }
    }

    ids
}
