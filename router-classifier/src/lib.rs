#![deny(missing_docs)]
//! Deterministic, pattern-based task classifier.
//!
//! Classification is pure and synchronous: no I/O, no model calls, no
//! randomness. Two calls with the same input text always produce the
//! same [`TaskClassification`].

mod patterns;

pub use patterns::ClassifierPatterns;

use router_types::{Capability, Category, Complexity, TaskClassification};

/// Stateless classifier holding a pattern table.
///
/// Cloning a [`ClassifierPatterns`] into the classifier at construction
/// keeps `classify` a plain `&self` method with no interior mutability —
/// there's nothing here a lock would protect.
#[derive(Debug, Clone)]
pub struct Classifier {
    patterns: ClassifierPatterns,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ClassifierPatterns::default())
    }
}

impl Classifier {
    /// Build a classifier over the given pattern table.
    #[must_use]
    pub fn new(patterns: ClassifierPatterns) -> Self {
        Self { patterns }
    }

    /// Classify `text`.
    #[must_use]
    pub fn classify(&self, text: &str) -> TaskClassification {
        let normalized = normalize(text);
        let token_count = text.split_whitespace().count();
        let requires_tools = contains_any(&normalized, &self.patterns.tool);

        if token_count <= 2 || is_trivial(&normalized, &self.patterns.trivial) {
            return TaskClassification {
                complexity: Complexity::Trivial,
                category: Category::Greeting,
                required_capabilities: vec![Capability::General],
                estimated_output_tokens: 50,
                requires_tools: false,
                confidence: 0.95,
            };
        }

        let category = classify_category(&normalized, &self.patterns);
        let complexity = classify_complexity(text, token_count, &normalized, &self.patterns);
        let required_capabilities = capabilities_for(category);
        let estimated_output_tokens = estimate_tokens(token_count, complexity);

        TaskClassification {
            complexity,
            category,
            required_capabilities,
            estimated_output_tokens,
            requires_tools,
            confidence: 0.7,
        }
    }
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
}

/// Whole-word match for single-word patterns, substring match for
/// multi-word phrases — avoids "the" matching inside "theme".
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.contains(' ') {
        return haystack.contains(needle);
    }
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == needle)
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| contains_word(haystack, n))
}

fn is_trivial(normalized: &str, trivial_patterns: &[String]) -> bool {
    let trimmed = normalized.trim().trim_end_matches(|c: char| "!?.,".contains(c));
    if trivial_patterns.iter().any(|p| p == trimmed) {
        return true;
    }
    contains_any(normalized, trivial_patterns)
}

fn classify_category(normalized: &str, patterns: &ClassifierPatterns) -> Category {
    if contains_any(normalized, &patterns.code) {
        Category::Code
    } else if is_math(normalized, &patterns.math_verbs) {
        Category::Math
    } else if contains_any(normalized, &patterns.tool) {
        Category::ToolUse
    } else if contains_any(normalized, &patterns.creative) {
        Category::Creative
    } else if contains_any(normalized, &patterns.analysis) {
        Category::Analysis
    } else if contains_any(normalized, &patterns.reasoning) {
        Category::Reasoning
    } else {
        Category::Question
    }
}

/// True if `normalized` contains a math verb, or a digit-operator-digit
/// bigram (e.g. "2+2", "3 * 4") found via a plain character scan.
fn is_math(normalized: &str, math_verbs: &[String]) -> bool {
    if contains_any(normalized, math_verbs) {
        return true;
    }
    let chars: Vec<char> = normalized.chars().collect();
    for window in chars.windows(3) {
        let (a, op, b) = (window[0], window[1], window[2]);
        if a.is_ascii_digit() && b.is_ascii_digit() && matches!(op, '+' | '-' | '*' | '/' | '^' | 'x') {
            return true;
        }
    }
    false
}

fn classify_complexity(
    original: &str,
    token_count: usize,
    normalized: &str,
    patterns: &ClassifierPatterns,
) -> Complexity {
    let question_marks = original.chars().filter(|&c| c == '?').count();
    let has_fenced_code = original.contains("```");
    let multi_step = contains_any(normalized, &patterns.connectives);

    if token_count <= 5 {
        Complexity::Simple
    } else if has_fenced_code || token_count > 100 {
        Complexity::VeryComplex
    } else if multi_step || question_marks > 2 || token_count > 50 {
        Complexity::Complex
    } else if token_count > 20 || question_marks > 1 {
        Complexity::Moderate
    } else {
        Complexity::Simple
    }
}

fn capabilities_for(category: Category) -> Vec<Capability> {
    match category {
        Category::Code => vec![Capability::Code, Capability::General],
        Category::Math => vec![Capability::Math, Capability::General],
        Category::Reasoning | Category::Analysis => vec![Capability::Reasoning, Capability::General],
        Category::ToolUse => vec![Capability::FunctionCalling, Capability::General],
        Category::Greeting | Category::Creative | Category::Question => vec![Capability::General],
    }
}

fn estimate_tokens(token_count: usize, complexity: Complexity) -> u32 {
    let base = 2 * u32::try_from(token_count).unwrap_or(u32::MAX);
    let multiplier: u32 = match complexity {
        Complexity::Trivial => 1,
        Complexity::Simple => 2,
        Complexity::Moderate => 4,
        Complexity::Complex => 8,
        Complexity::VeryComplex => 12,
    };
    base.saturating_mul(multiplier).clamp(50, 2000)
}
