//! Industry compliance packs.
//!
//! A pack is a named, versioned bundle of pattern rules mapped to a
//! regulatory framework, plus optional severity overrides for rules from
//! other sources.

use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::rule::RuleDefinition;
use super::types::{Category, Severity};

/// Names of the packs shipped with guardrails.
pub const BUILTIN_PACKS: [&str; 4] = ["banking", "healthcare", "government", "telecom"];

/// A named, versioned bundle of rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompliancePack {
    pub name: String,
    pub version: Version,
    /// Regulatory framework(s) the pack maps to.
    pub framework: String,
    #[serde(default)]
    pub description: String,
    pub rules: Vec<RuleDefinition>,
    /// Severity overrides for rules defined elsewhere (keyed by rule id).
    #[serde(default)]
    pub severity_overrides: BTreeMap<String, Severity>,
}

impl CompliancePack {
    /// Look up a shipped pack by name (case-insensitive).
    pub fn builtin(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "banking" => Some(banking()),
            "healthcare" => Some(healthcare()),
            "government" => Some(government()),
            "telecom" => Some(telecom()),
            _ => None,
        }
    }

    /// Display label, e.g. `banking@1.0.0`.
    pub fn label(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

fn pack(name: &str, framework: &str, description: &str) -> CompliancePack {
    CompliancePack {
        name: name.to_string(),
        version: Version::new(1, 0, 0),
        framework: framework.to_string(),
        description: description.to_string(),
        rules: Vec::new(),
        severity_overrides: BTreeMap::new(),
    }
}

fn banking() -> CompliancePack {
    let mut p = pack(
        "banking",
        "PCI DSS, GDPR",
        "Controls for banking and financial institutions",
    );
    p.rules = vec![
        RuleDefinition::new(
            "BANK-001",
            "PCI DSS: No hardcoded cardholder data",
            Category::Security,
            Severity::Critical,
        )
        .pattern(
            r#"(card_number|pan|cvv|cvc)\s*=\s*['"][0-9 ]{3,}['"]"#,
            "Cardholder data literal",
        )
        .pattern(
            r"\b(?:4\d{3}|5[1-5]\d{2})[ -]?\d{4}[ -]?\d{4}[ -]?\d{4}\b",
            "Primary account number literal",
        )
        .message("PCI DSS 3.2.1 - Render cardholder data unreadable in storage")
        .cwe("CWE-312"),
        RuleDefinition::new(
            "BANK-002",
            "PCI DSS: Encryption in transit",
            Category::Security,
            Severity::High,
        )
        .pattern(r#"['"]http://[a-z0-9]"#, "Plaintext HTTP endpoint")
        .pattern(r"verify\s*=\s*False", "TLS certificate verification disabled")
        .pattern(r"InsecureSkipVerify:\s*true", "TLS certificate verification disabled")
        .pattern(r"_create_unverified_context", "TLS certificate verification disabled")
        .message("PCI DSS 4.1 - Data in transit must be encrypted")
        .cwe("CWE-319"),
        RuleDefinition::new(
            "BANK-003",
            "PCI DSS: Cardholder data in logs",
            Category::Compliance,
            Severity::High,
        )
        .pattern(
            r"(?:log|logger|logging|console)\.\w+\s*\(.*\b(?:card_number|cvv|pan)\b",
            "Cardholder data written to logs",
        )
        .message("PCI DSS 10.2 - Audit trails must not contain cardholder data")
        .cwe("CWE-532"),
        RuleDefinition::new(
            "BANK-004",
            "GDPR: Data retention",
            Category::Compliance,
            Severity::High,
        )
        .pattern(
            r"retention_days\s*[=:]\s*(?:-1|0|None|null)\b",
            "Unbounded personal data retention",
        )
        .message("GDPR Article 5 - Personal data must not be kept longer than necessary"),
    ];
    p.severity_overrides
        .insert("SEC-005".to_string(), Severity::Critical);
    p
}

fn healthcare() -> CompliancePack {
    let mut p = pack("healthcare", "HIPAA", "Controls for healthcare providers");
    p.rules = vec![
        RuleDefinition::new(
            "HIPAA-001",
            "HIPAA: PHI encryption",
            Category::Security,
            Severity::Critical,
        )
        .pattern(
            r#"(ssn|social_security|medical_record_number|mrn|diagnosis)\s*=\s*['"][^'"]+['"]"#,
            "PHI literal in source",
        )
        .message("45 CFR 164.312(a)(2)(iv) - Implement encryption for PHI")
        .cwe("CWE-312"),
        RuleDefinition::new(
            "HIPAA-002",
            "HIPAA: Access controls",
            Category::Security,
            Severity::High,
        )
        .pattern(r"@csrf_exempt", "CSRF protection disabled")
        .pattern(r"permission_classes\s*=\s*\[\s*\]", "Access control disabled")
        .pattern(r"\bAllowAny\b", "Access control disabled")
        .message("45 CFR 164.312(a)(1) - Implement access controls")
        .cwe("CWE-284"),
        RuleDefinition::new(
            "HIPAA-003",
            "HIPAA: PHI in logs",
            Category::Compliance,
            Severity::High,
        )
        .pattern(
            r"(?:print|console\.log|log\w*\.\w+)\s*\(.*\b(?:ssn|patient|diagnosis|mrn)\b",
            "PHI written to logs",
        )
        .message("45 CFR 164.312(b) - Audit controls must protect PHI")
        .cwe("CWE-532"),
    ];
    p.severity_overrides
        .insert("SEC-003".to_string(), Severity::Critical);
    p
}

fn government() -> CompliancePack {
    let mut p = pack(
        "government",
        "FedRAMP, FISMA",
        "Controls for government agencies",
    );
    p.rules = vec![
        RuleDefinition::new(
            "FEDRAMP-001",
            "FedRAMP: FIPS-validated cryptography",
            Category::Security,
            Severity::High,
        )
        .pattern(r"(?-i:\b(?:RC4|Blowfish|MD4)\b)", "Non-FIPS cipher")
        .pattern(r"Math\.random\s*\(", "Non-cryptographic randomness")
        .message("FedRAMP SC-13 - Use FIPS 140 validated cryptography")
        .cwe("CWE-327"),
        RuleDefinition::new(
            "FISMA-001",
            "FISMA: Minimum security controls",
            Category::Security,
            Severity::High,
        )
        .pattern(r"(?-i:\bDEBUG\s*=\s*True\b)", "Debug mode enabled")
        .pattern(r"\bdebug\s*[=:]\s*true\b", "Debug mode enabled")
        .message("FISMA - Implement NIST SP 800-53 baseline controls")
        .cwe("CWE-489"),
        RuleDefinition::new(
            "FISMA-002",
            "FISMA: Continuous monitoring",
            Category::Compliance,
            Severity::Medium,
        )
        .pattern(r"logging\.disable\s*\(", "Logging disabled")
        .pattern(
            r#"log_level\s*[=:]\s*['"]?(?:none|off)\b"#,
            "Logging disabled",
        )
        .message("FISMA - Implement continuous monitoring program"),
    ];
    p
}

fn telecom() -> CompliancePack {
    let mut p = pack(
        "telecom",
        "Telecom regulation",
        "Controls for telecommunications providers",
    );
    p.rules = vec![
        RuleDefinition::new(
            "TELECOM-001",
            "Data residency requirement",
            Category::Compliance,
            Severity::Critical,
        )
        .pattern(
            r#"region\s*[=:]\s*['"](?:us|ap|sa|me|af)-[a-z]+-\d['"]"#,
            "Hardcoded out-of-jurisdiction storage region",
        )
        .message("Customer data must remain in jurisdiction"),
        RuleDefinition::new(
            "TELECOM-002",
            "Network security requirements",
            Category::Security,
            Severity::High,
        )
        .pattern(r"0\.0\.0\.0/0", "Ingress open to the internet")
        .pattern(
            r#"bind\s*\(\s*\(?\s*['"]0\.0\.0\.0['"]"#,
            "Listener bound to all interfaces",
        )
        .message("Implement network security measures")
        .cwe("CWE-284"),
        RuleDefinition::new(
            "TELECOM-003",
            "Lawful intercept capabilities",
            Category::Compliance,
            Severity::High,
        )
        .pattern(
            r"(?:disable|skip)_(?:intercept|cdr|call_detail)",
            "Call detail recording disabled",
        )
        .message("Maintain lawful intercept capabilities"),
    ];
    p
}
