//! The built-in rule catalog.
//!
//! Each rule groups related patterns; the first pattern that matches names
//! the finding. Rules fire at most once per line.

use super::rule::RuleDefinition;
use super::types::{Category, Severity};

const OWASP_CRYPTO: &str = "A02:2021 - Cryptographic Failures";
const OWASP_INJECTION: &str = "A03:2021 - Injection";
const OWASP_INTEGRITY: &str = "A08:2021 - Software and Data Integrity Failures";
const OWASP_COMPONENTS: &str = "A06:2021 - Vulnerable and Outdated Components";

/// Definitions of every built-in rule.
pub fn builtin_definitions() -> Vec<RuleDefinition> {
    vec![
        RuleDefinition::new("SEC-001", "Hardcoded Secrets", Category::Security, Severity::Critical)
            .pattern(r#"api[_-]?key\s*=\s*['"]([^'"]+)['"]"#, "Hardcoded API Key")
            .pattern(r#"password\s*=\s*['"]([^'"]+)['"]"#, "Hardcoded Password")
            .pattern(r#"secret\s*=\s*['"]([^'"]+)['"]"#, "Hardcoded Secret")
            .pattern(r#"token\s*=\s*['"]([^'"]+)['"]"#, "Hardcoded Token")
            .pattern(r"(?-i:AKIA[0-9A-Z]{16})", "AWS Access Key ID")
            .pattern(
                r#"aws_secret_access_key\s*=\s*['"]([^'"]+)['"]"#,
                "AWS Secret Key",
            )
            .message("This could expose sensitive data or enable attacks")
            .cwe("CWE-798")
            .owasp(OWASP_CRYPTO),
        RuleDefinition::new("SEC-002", "SQL Injection", Category::Security, Severity::Critical)
            .pattern(
                r#"execute\s*\(\s*f?['"].*\{.*\}.*['"]"#,
                "SQL Injection: String interpolation in query",
            )
            .pattern(
                r#"query\s*\(\s*f['"].*\{.*\}.*['"]"#,
                "SQL Injection: F-string in SQL query",
            )
            .pattern(r"SELECT.*\+.*str\(", "SQL Injection: String concatenation in query")
            .message("Use parameterized queries instead")
            .cwe("CWE-89")
            .owasp(OWASP_INJECTION),
        RuleDefinition::new(
            "SEC-003",
            "Insecure Deserialization",
            Category::Security,
            Severity::High,
        )
        .pattern(
            r"pickle\.loads?\s*\(",
            "Insecure Deserialization: pickle with untrusted data",
        )
        .pattern(
            r"json\.loads\s*\(\s*user_input",
            "Insecure JSON deserialization of user input",
        )
        .pattern(
            r"yaml\.load\s*\(\s*[^,]*\)",
            "Insecure YAML deserialization: Missing Loader",
        )
        .message("Deserializing untrusted data can lead to code execution")
        .cwe("CWE-502")
        .owasp(OWASP_INTEGRITY),
        RuleDefinition::new(
            "SEC-004",
            "Unsafe Code Execution",
            Category::Security,
            Severity::Critical,
        )
        .pattern(r"\beval\s*\(", "Unsafe Code Execution: eval()")
        .pattern(r"\bexec\s*\(", "Unsafe Code Execution: exec()")
        .pattern(
            r"subprocess\.\w+\s*\(.*shell\s*=\s*True",
            "Unsafe Shell Execution",
        )
        .pattern(
            r"os\.system\s*\(",
            "Unsafe System Command Execution: os.system()",
        )
        .message("Executing dynamic input enables injection")
        .cwe("CWE-95")
        .owasp(OWASP_INJECTION),
        RuleDefinition::new("SEC-005", "Weak Cryptography", Category::Security, Severity::High)
            .pattern(r"hashlib\.md5\s*\(", "Weak Cryptography: MD5 is insecure")
            .pattern(r"hashlib\.sha1\s*\(", "Weak Cryptography: SHA1 is deprecated")
            .pattern(r"(?-i:\bDES)\s*\(", "Weak Cryptography: DES is insecure")
            .message("Use a modern algorithm such as SHA-256 or AES-GCM")
            .cwe("CWE-327")
            .owasp(OWASP_CRYPTO),
        RuleDefinition::new(
            "AI-001",
            "Incomplete AI-Generated Code",
            Category::AiRisk,
            Severity::Medium,
        )
        .pattern(r"def\s+\w+\([^)]*\):\s*pass\s*$", "Empty function stub")
        .pattern(r"raise\s+NotImplementedError", "Unimplemented required method")
        .pattern(
            r"def\s+\w+\([^)]*\):\s*\.\.\.\s*$",
            "Ellipsis placeholder function",
        )
        .pattern(r"TODO.*CRITICAL", "Critical unfinished work")
        .message("Potentially incomplete AI-generated implementation")
        .cwe("CWE-1077")
        .owasp(OWASP_COMPONENTS)
        .copilot_only()
        .include_comments(),
        RuleDefinition::new(
            "AI-002",
            "Risky AI-Generated Pattern",
            Category::AiRisk,
            Severity::Medium,
        )
        .pattern(r"except\s*:\s*pass", "Bare except without handling")
        .pattern(r"except\s+Exception\s*:\s*pass", "Generic exception suppression")
        .pattern(r"if\s+\w+:\s*pass\s*else:", "Empty if branch")
        .pattern(r"catch\s*\([^)]*\)\s*\{\s*\}", "Empty catch block")
        .pattern(r"#\s*type:\s*ignore", "Type checking ignored")
        .pattern(r"#\s*noqa", "Linting warning suppressed")
        .message("AI-generated code with risky pattern")
        .cwe("CWE-1050")
        .owasp("Code Quality Issue")
        .copilot_only()
        .include_comments(),
        RuleDefinition::new(
            "AI-003",
            "AI Scaffolding Left In",
            Category::AiRisk,
            Severity::Info,
        )
        .pattern(r"#\s*This is a\s+", "Assistant starter comment")
        .pattern(r"(#|//)\s*TODO:\s*Implement", "Generic TODO comment")
        .pattern(r"(#|//)\s*Replace with your", "Placeholder comment")
        .pattern(r"(#|//)\s*Add your logic here", "Generic implementation placeholder")
        .pattern(r"pass\s*#\s*TODO", "Incomplete stub with TODO")
        .message("Scaffolding typical of assistant-generated code")
        .owasp("Code Quality Issue")
        .copilot_only()
        .include_comments(),
    ]
}
