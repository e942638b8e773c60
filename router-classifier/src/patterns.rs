//! Pattern tables for the classifier.
//!
//! Per the design note "pattern-based classifier... must be centralized
//! and loadable from configuration," these tables are plain data — a
//! caller (e.g. the `router` binary, from `RouterConfig`) may supply an
//! alternate [`ClassifierPatterns`] without touching classifier logic.

/// The full set of word/phrase tables the classifier matches against.
#[derive(Debug, Clone)]
pub struct ClassifierPatterns {
    /// Greetings, acknowledgements, yes/no phrases.
    pub trivial: Vec<String>,
    /// Programming-language names, keywords, and debugging verbs.
    pub code: Vec<String>,
    /// Arithmetic/math verbs.
    pub math_verbs: Vec<String>,
    /// Verbs implying a side-effecting tool call.
    pub tool: Vec<String>,
    /// Verbs implying original content generation.
    pub creative: Vec<String>,
    /// Verbs implying analysis/comparison/evaluation.
    pub analysis: Vec<String>,
    /// Verbs implying multi-step logical reasoning.
    pub reasoning: Vec<String>,
    /// Multi-step connectives ("then", "next", "after", "also").
    pub connectives: Vec<String>,
}

fn strs(words: &[&str]) -> Vec<String> {
    words.iter().map(|s| s.to_string()).collect()
}

impl Default for ClassifierPatterns {
    fn default() -> Self {
        Self {
            trivial: strs(&[
                "hi", "hello", "hey", "yo", "hiya", "greetings", "howdy",
                "thanks", "thank you", "ty", "cheers",
                "ok", "okay", "k", "kk", "sure", "fine", "alright",
                "yes", "no", "yep", "yup", "nope", "nah",
                "bye", "goodbye", "see ya", "later",
                "good morning", "good night", "good evening", "good afternoon",
                "cool", "nice", "great", "awesome",
            ]),
            code: strs(&[
                "python", "rust", "javascript", "typescript", "golang", "java",
                "c++", "ruby", "kotlin", "swift", "php", "bash", "sql",
                "function", "def ", "class ", "```", "compile", "syntax error",
                "stack trace", "debug", "fix this bug", "exception", "segfault",
                "refactor", "unit test", "null pointer", "traceback",
            ]),
            math_verbs: strs(&[
                "calculate", "compute", "solve", "sum of", "multiply", "divide",
                "square root", "derivative", "integral", "equation", "factorial",
                "how much is", "what is the result of",
            ]),
            tool: strs(&[
                "run", "execute", "fetch", "browse", "shell", "url", "http://",
                "https://", "file", "directory", "download", "open the file",
                "list files", "curl", "ping",
            ]),
            creative: strs(&[
                "write a story", "write a poem", "compose", "draft", "generate a",
                "make up a", "invent a",
            ]),
            analysis: strs(&["analyze", "compare", "evaluate", "assess", "critique"]),
            reasoning: strs(&["why", "because", "reason", "logic", "think", "explain why"]),
            connectives: strs(&["then", "next", "after that", "also"]),
        }
    }
}
