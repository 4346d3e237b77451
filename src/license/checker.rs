//! File-level license and IP-risk detection.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::classify::{LicenseClass, classify, split_expression};
use crate::diff::{AddedLine, ParsedFile};
use crate::policy::Policy;
use crate::rules::{Category, RuleSource, Severity, Violation, bounded_snippet};

const CWE_LICENSE: &str = "CWE-1104";
const OWASP_LICENSE: &str = "IP/License Risk";

static SPDX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)SPDX-License-Identifier:\s*([A-Za-z0-9.+\-() ]+)").expect("Invalid SPDX regex")
});

static LICENSE_COMMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:#|//|\*|--)\s*License:\s*([A-Za-z0-9.+\-]+)")
        .expect("Invalid license comment regex")
});

/// Well-known license header phrases and the identifier they imply.
static LICENSE_HEADERS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)\bGNU\s+Affero\s+General\s+Public\s+License\b", "AGPL-3.0"),
        (r"(?i)\bGNU\s+(?:General\s+Public\s+License|GPL),?\s+(?:version\s+|v)3\b", "GPL-3.0"),
        (r"(?i)\bGNU\s+(?:General\s+Public\s+License|GPL),?\s+(?:version\s+|v)2\b", "GPL-2.0"),
        (r"(?i)\bApache\s+License,?\s+(?:Version\s+)?2\.0\b", "Apache-2.0"),
        (r"(?i)\bMIT\s+License\b", "MIT"),
    ]
    .into_iter()
    .map(|(pattern, id)| (Regex::new(pattern).expect("Invalid license header regex"), id))
    .collect()
});

/// Severity assigned to an IP-001 marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerWeight {
    Copied,
    Attribution,
}

static COPY_MARKERS: LazyLock<Vec<(Regex, MarkerWeight, &'static str)>> = LazyLock::new(|| {
    [
        (
            r"(?i)(?:#|//|/?\*|--)\s*(?:this\s+(?:code\s+)?is\s+)?copied\s+from\b",
            MarkerWeight::Copied,
            "Copied code marker",
        ),
        (
            r"(?i)(?:#|//|/?\*|--)\s*based\s+on\b",
            MarkerWeight::Attribution,
            "Code derivative marker",
        ),
        (
            r"(?i)(?:#|//|/?\*|--)\s*source:\s*\S",
            MarkerWeight::Attribution,
            "Attribution comment",
        ),
    ]
    .into_iter()
    .map(|(pattern, weight, label)| {
        (Regex::new(pattern).expect("Invalid copy marker regex"), weight, label)
    })
    .collect()
});

static PLACEHOLDER_IMPORTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"(?i)\bfrom\s+some_library\s+import\b", r"\bimport\s+TODO\b"]
        .into_iter()
        .map(|p| Regex::new(p).expect("Invalid placeholder import regex"))
        .collect()
});

static BOILERPLATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\breplace\s+(?:this\s+)?with\s+your\b",
        r"(?i)\bTODO:?\s*replace\b",
        r"(?i)\badd\s+your\s+(?:\w+\s+)?logic\s+here\b",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("Invalid boilerplate regex"))
    .collect()
});

static COPYRIGHT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bcopyright\s+(?:\(c\)\s*|©\s*)?\d{4}(?:\s*-\s*\d{4})?,?\s+\w+")
        .expect("Invalid copyright regex")
});

/// Identifiers declared on one line, in order of appearance.
pub fn detect_licenses(line: &str) -> Vec<String> {
    if let Some(caps) = SPDX_REGEX.captures(line) {
        return split_expression(&caps[1]);
    }
    if let Some(caps) = LICENSE_COMMENT_REGEX.captures(line) {
        return vec![caps[1].to_string()];
    }

    LICENSE_HEADERS
        .iter()
        .find(|(regex, _)| regex.is_match(line))
        .map(|(_, id)| vec![id.to_string()])
        .unwrap_or_default()
}

/// Whether a detected license produces a violation under a policy.
pub fn license_violates(license: &str, policy: &Policy) -> bool {
    match classify(license) {
        LicenseClass::Permissive => false,
        LicenseClass::Restrictive => !policy.allows_license(license),
        LicenseClass::Incompatible | LicenseClass::Unknown => true,
    }
}

/// Scans whole files for license and IP-risk indicators.
///
/// At most one violation per indicator type per file, reported at the first
/// offending line.
#[derive(Debug, Clone)]
pub struct LicenseChecker {
    max_snippet_chars: usize,
}

impl LicenseChecker {
    pub fn new(max_snippet_chars: usize) -> Self {
        Self { max_snippet_chars }
    }

    pub fn check_file(
        &self,
        parsed: &ParsedFile,
        copilot_generated: bool,
        policy: &Policy,
    ) -> Vec<Violation> {
        if !policy.category_enabled(Category::License) {
            return Vec::new();
        }

        let mut findings = Findings::default();
        for line in &parsed.lines {
            findings.observe(line, policy);
        }

        let mut violations = Vec::new();
        let mut emit = |id: &str, name: &str, severity: Severity, line: &AddedLine, message: String| {
            if policy.disabled_rules.contains(id) {
                return;
            }
            violations.push(Violation {
                rule_id: id.to_string(),
                rule_name: name.to_string(),
                category: Category::License,
                severity: policy.severity_overrides.get(id).copied().unwrap_or(severity),
                message,
                file_path: line.file_path.clone(),
                line_number: line.line_number,
                line_content: bounded_snippet(&line.content, self.max_snippet_chars),
                cwe_id: Some(CWE_LICENSE.to_string()),
                owasp_category: Some(OWASP_LICENSE.to_string()),
                is_copilot_generated: copilot_generated,
                suggested_fix: None,
                source: RuleSource::BuiltIn,
            });
        };

        if let Some(line) = findings.license_line {
            let listed = findings
                .offending_licenses
                .iter()
                .map(|l| format!("'{}'", l))
                .collect::<Vec<_>>()
                .join(", ");
            emit(
                "LICENSE-001",
                "Incompatible License Detected",
                Severity::High,
                line,
                format!(
                    "Detected license {} not permitted; allowed: {}",
                    listed,
                    policy.allowed_licenses.join(", ")
                ),
            );
        }

        if let Some((line, weight, label)) = findings.copy_marker {
            let severity = match weight {
                MarkerWeight::Copied => Severity::Medium,
                MarkerWeight::Attribution => Severity::Info,
            };
            emit(
                "IP-001",
                "Code Derivative Detection",
                severity,
                line,
                format!("IP compliance check: {}. Verify license compatibility.", label),
            );
        }

        if let Some(line) = findings.placeholder_import {
            emit(
                "IP-002",
                "Suspicious Import Pattern",
                Severity::Medium,
                line,
                "IP risk: Placeholder import, likely from copied code".to_string(),
            );
        }

        if let Some(line) = findings.boilerplate {
            emit(
                "IP-003",
                "Boilerplate Placeholder",
                Severity::Medium,
                line,
                "IP risk: Template placeholder left in code".to_string(),
            );
        }

        if let Some(line) = findings.copyright {
            emit(
                "IP-004",
                "Copyright Notice",
                Severity::Low,
                line,
                "Copyright header: verify license compatibility".to_string(),
            );
        }

        if !violations.is_empty() {
            debug!(file = %parsed.file_path, count = violations.len(), "license indicators found");
        }
        violations
    }
}

/// First offending line per indicator type.
#[derive(Default)]
struct Findings<'a> {
    license_line: Option<&'a AddedLine>,
    offending_licenses: Vec<String>,
    copy_marker: Option<(&'a AddedLine, MarkerWeight, &'static str)>,
    placeholder_import: Option<&'a AddedLine>,
    boilerplate: Option<&'a AddedLine>,
    copyright: Option<&'a AddedLine>,
}

impl<'a> Findings<'a> {
    fn observe(&mut self, line: &'a AddedLine, policy: &Policy) {
        let text = line.content.as_str();

        for license in detect_licenses(text) {
            if license_violates(&license, policy) {
                self.license_line.get_or_insert(line);
                if !self
                    .offending_licenses
                    .iter()
                    .any(|l| l.eq_ignore_ascii_case(&license))
                {
                    self.offending_licenses.push(license);
                }
            }
        }

        if let Some((_, weight, label)) = COPY_MARKERS.iter().find(|(re, _, _)| re.is_match(text)) {
            match self.copy_marker {
                None => self.copy_marker = Some((line, *weight, *label)),
                // A copied marker anywhere raises the finding to medium.
                Some((first, MarkerWeight::Attribution, _)) if *weight == MarkerWeight::Copied => {
                    self.copy_marker = Some((first, *weight, *label));
                }
                Some(_) => {}
            }
        }

        if self.placeholder_import.is_none() && PLACEHOLDER_IMPORTS.iter().any(|re| re.is_match(text)) {
            self.placeholder_import = Some(line);
        }

        if self.boilerplate.is_none() && BOILERPLATE.iter().any(|re| re.is_match(text)) {
            self.boilerplate = Some(line);
        }

        if self.copyright.is_none() && COPYRIGHT_REGEX.is_match(text) {
            self.copyright = Some(line);
        }
    }
}
