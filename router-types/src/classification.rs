//! `TaskClassification` and its component enums.

use serde::{Deserialize, Serialize};

use crate::model::Capability;

/// How demanding a request is judged to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Complexity {
    /// Two tokens or fewer, or a trivial pattern match.
    Trivial,
    /// Short, single-clause requests.
    Simple,
    /// Medium-length requests.
    Moderate,
    /// Multi-step or long requests.
    Complex,
    /// Code blocks or very long requests.
    VeryComplex,
}

/// What kind of request this is, in descending match priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    /// A greeting or acknowledgement.
    Greeting,
    /// A request for a tool invocation.
    ToolUse,
    /// A source-code request.
    Code,
    /// An arithmetic/mathematical request.
    Math,
    /// A request to produce original content.
    Creative,
    /// A request to analyze, compare, or evaluate something.
    Analysis,
    /// A request for multi-step logical reasoning.
    Reasoning,
    /// Anything else that looks like a question.
    Question,
}

/// The deterministic classification of one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskClassification {
    /// How demanding the request is judged to be.
    pub complexity: Complexity,
    /// What kind of request this is.
    pub category: Category,
    /// Capabilities needed to serve this request, primary first.
    pub required_capabilities: Vec<Capability>,
    /// Estimated output length, clamped to `[50, 2000]`.
    pub estimated_output_tokens: u32,
    /// Whether the classifier detected a tool-invocation pattern.
    pub requires_tools: bool,
    /// Classifier confidence in `[0, 1]`.
    pub confidence: f32,
}

impl TaskClassification {
    /// The first (primary) required capability.
    ///
    /// `required_capabilities` is never empty by construction (the
    /// classifier's category table always supplies at least one), so
    /// this falls back to `General` only as a defensive default.
    #[must_use]
    pub fn primary_capability(&self) -> Capability {
        self.required_capabilities
            .first()
            .copied()
            .unwrap_or(Capability::General)
    }
}
