//! Counts whitespace-delimited words in a `text` parameter.

use std::future::Future;
use std::pin::Pin;

use router_tool::ToolDyn;
use router_types::{ParameterSpec, ParameterType, ResourceProfile, SecurityScope, ToolCategory, ToolManifest, ToolResult, TrustLevel};

/// The `word_count` builtin.
pub struct WordCountTool {
    manifest: ToolManifest,
}

impl WordCountTool {
    /// Construct with a fixed manifest.
    #[must_use]
    pub fn new() -> Self {
        Self {
            manifest: ToolManifest {
                name: "word_count".into(),
                description: "counts whitespace-delimited words in `text`".into(),
                category: ToolCategory::Data,
                requires_confirmation: false,
                trust_level: TrustLevel::Core,
                security_scope: std::collections::BTreeSet::from([SecurityScope::ReadOnly]),
                resource_profile: ResourceProfile::CpuLight,
                parameters: vec![ParameterSpec::required("text", ParameterType::String, "the text to count words in")],
            },
        }
    }
}

impl Default for WordCountTool {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolDyn for WordCountTool {
    fn manifest(&self) -> &ToolManifest {
        &self.manifest
    }

    fn call(&self, params: serde_json::Value) -> Pin<Box<dyn Future<Output = ToolResult> + Send + '_>> {
        Box::pin(async move {
            match params.get("text").and_then(|v| v.as_str()) {
                Some(text) => ToolResult::success(serde_json::json!({"words": text.split_whitespace().count()})),
                None => ToolResult::failure(router_types::ErrorKind::Validation, "missing `text` parameter"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_words() {
        let tool = WordCountTool::new();
        let result = tool.call(serde_json::json!({"text": "a quick brown fox"})).await;
        assert!(result.success);
        assert_eq!(result.value.unwrap()["words"], serde_json::json!(4));
    }
}
