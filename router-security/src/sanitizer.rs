//! Pattern-based input sanitizer.
//!
//! Grounded on `neuron-hook-security`'s `regex::Regex` pattern-list style
//! (`RedactionHook`/`ExfilGuardHook`): a fixed set of compiled patterns
//! classifies a risk level. Unlike those hooks, the sanitizer never
//! blocks unilaterally — it returns an advisory verdict and leaves
//! blocking policy to the caller's `trust_level`/`security_scope` check.

use regex::Regex;

/// How dangerous a piece of text looks, from a pattern-table sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    /// Nothing matched any known-risky pattern.
    Low,
    /// Matched a pattern worth a caller's second look.
    Medium,
    /// Matched a pattern strongly associated with abuse.
    High,
    /// Matched a pattern with a near-certain destructive/exfiltration intent.
    Critical,
}

/// The sanitizer's advisory verdict for one piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizationVerdict {
    /// The highest risk level any pattern in the table matched.
    pub risk_level: RiskLevel,
    /// Which pattern matched, when `risk_level > Low`.
    pub reason: Option<String>,
}

impl SanitizationVerdict {
    fn low() -> Self {
        Self {
            risk_level: RiskLevel::Low,
            reason: None,
        }
    }
}

struct RiskPattern {
    regex: Regex,
    level: RiskLevel,
    reason: &'static str,
}

/// Compiled pattern table plus the URL-specific allow/deny policy.
pub struct Sanitizer {
    patterns: Vec<RiskPattern>,
    allowed_url_schemes: Vec<String>,
    suspicious_domains: Vec<String>,
}

impl Sanitizer {
    /// Build the sanitizer with its built-in pattern table and the
    /// caller-supplied URL policy.
    #[must_use]
    pub fn new(allowed_url_schemes: Vec<String>, suspicious_domains: Vec<String>) -> Self {
        Self {
            patterns: builtin_patterns(),
            allowed_url_schemes,
            suspicious_domains,
        }
    }

    /// Classify `text` against every pattern, returning the highest risk
    /// level reached.
    #[must_use]
    pub fn classify_text(&self, text: &str) -> SanitizationVerdict {
        self.patterns
            .iter()
            .filter(|p| p.regex.is_match(text))
            .max_by_key(|p| p.level)
            .map(|p| SanitizationVerdict {
                risk_level: p.level,
                reason: Some(p.reason.to_string()),
            })
            .unwrap_or_else(SanitizationVerdict::low)
    }

    /// Reduce `name` to the allowed filename alphabet
    /// (`[A-Za-z0-9._-]{1,255}`), substituting `_` for any other byte and
    /// falling back to a single `_` if nothing survives.
    #[must_use]
    pub fn sanitize_filename(&self, name: &str) -> String {
        let mut sanitized: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
            .collect();
        sanitized.truncate(255);
        if sanitized.is_empty() {
            sanitized.push('_');
        }
        sanitized
    }

    /// Reject `url` if its host is empty, its scheme isn't allowlisted, or
    /// its host is in the suspicious-domain set.
    pub fn validate_url(&self, raw_url: &str) -> Result<(), SanitizationVerdict> {
        let parsed = url::Url::parse(raw_url).map_err(|e| SanitizationVerdict {
            risk_level: RiskLevel::Medium,
            reason: Some(format!("unparseable URL: {e}")),
        })?;

        let Some(host) = parsed.host_str() else {
            return Err(SanitizationVerdict {
                risk_level: RiskLevel::High,
                reason: Some("URL has no host".into()),
            });
        };
        if host.is_empty() {
            return Err(SanitizationVerdict {
                risk_level: RiskLevel::High,
                reason: Some("URL host is empty".into()),
            });
        }
        if !self.allowed_url_schemes.iter().any(|s| s == parsed.scheme()) {
            return Err(SanitizationVerdict {
                risk_level: RiskLevel::High,
                reason: Some(format!("scheme `{}` is not allowlisted", parsed.scheme())),
            });
        }
        if self.suspicious_domains.iter().any(|d| d == host) {
            return Err(SanitizationVerdict {
                risk_level: RiskLevel::Critical,
                reason: Some(format!("host `{host}` is on the suspicious-domain list")),
            });
        }
        Ok(())
    }
}

fn builtin_patterns() -> Vec<RiskPattern> {
    let compile = |pattern: &str| Regex::new(pattern).expect("built-in pattern is valid regex");
    vec![
        RiskPattern {
            regex: compile(r"rm\s+-rf\s+/(?:\s|$)"),
            level: RiskLevel::Critical,
            reason: "recursive root deletion",
        },
        RiskPattern {
            regex: compile(r"(?:>|dd\s+.*of=)\s*/dev/(?:sd|nvme|hd)\w*"),
            level: RiskLevel::Critical,
            reason: "raw disk-device write",
        },
        RiskPattern {
            regex: compile(r":\(\)\s*\{\s*:\|:&\s*\}\s*;"),
            level: RiskLevel::Critical,
            reason: "fork bomb",
        },
        RiskPattern {
            regex: compile(r"curl\s[^|]*\|\s*(?:sh|bash)\b"),
            level: RiskLevel::Critical,
            reason: "pipe-to-shell download-execution",
        },
        RiskPattern {
            regex: compile(r"\.\./"),
            level: RiskLevel::High,
            reason: "path traversal",
        },
        RiskPattern {
            regex: compile(r"^/(?:etc|boot|proc|sys)(?:/|$)"),
            level: RiskLevel::High,
            reason: "absolute system path",
        },
        RiskPattern {
            regex: compile(r"(?i)(?:'|\bor\b|--|;)\s*(?:or|and)\s+1\s*=\s*1|union\s+select|drop\s+table"),
            level: RiskLevel::High,
            reason: "SQL-injection shape",
        },
        RiskPattern {
            regex: compile(r"(?i)<script[\s>]"),
            level: RiskLevel::Medium,
            reason: "script-tag XSS",
        },
    ]
}
