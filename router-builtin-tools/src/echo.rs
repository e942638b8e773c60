//! Returns its `text` parameter unchanged. Useful for wiring tests and
//! as a template for new builtins.

use std::future::Future;
use std::pin::Pin;

use router_tool::ToolDyn;
use router_types::{ParameterSpec, ParameterType, ResourceProfile, SecurityScope, ToolCategory, ToolManifest, ToolResult, TrustLevel};

/// The `echo` builtin.
pub struct EchoTool {
    manifest: ToolManifest,
}

impl EchoTool {
    /// Construct with a fixed manifest; `router-tool-registry` instantiates
    /// builtins with a zero-argument constructor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            manifest: ToolManifest {
                name: "echo".into(),
                description: "returns the `text` parameter unchanged".into(),
                category: ToolCategory::Utility,
                requires_confirmation: false,
                trust_level: TrustLevel::Core,
                security_scope: std::collections::BTreeSet::from([SecurityScope::ReadOnly]),
                resource_profile: ResourceProfile::CpuLight,
                parameters: vec![ParameterSpec::required("text", ParameterType::String, "the text to echo back")],
            },
        }
    }
}

impl Default for EchoTool {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolDyn for EchoTool {
    fn manifest(&self) -> &ToolManifest {
        &self.manifest
    }

    fn call(&self, params: serde_json::Value) -> Pin<Box<dyn Future<Output = ToolResult> + Send + '_>> {
        Box::pin(async move {
            match params.get("text") {
                Some(text) => ToolResult::success(text.clone()),
                None => ToolResult::failure(router_types::ErrorKind::Validation, "missing `text` parameter"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echoes_text_back() {
        let tool = EchoTool::new();
        let result = tool.call(serde_json::json!({"text": "hi"})).await;
        assert!(result.success);
        assert_eq!(result.value, Some(serde_json::json!("hi")));
    }
}
