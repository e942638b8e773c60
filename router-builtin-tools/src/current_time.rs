//! Reports the current Unix timestamp. Deliberately has no parameters.

use std::future::Future;
use std::pin::Pin;
use std::time::{SystemTime, UNIX_EPOCH};

use router_tool::ToolDyn;
use router_types::{ResourceProfile, SecurityScope, ToolCategory, ToolManifest, ToolResult, TrustLevel};

/// The `current_time` builtin.
pub struct CurrentTimeTool {
    manifest: ToolManifest,
}

impl CurrentTimeTool {
    /// Construct with a fixed manifest.
    #[must_use]
    pub fn new() -> Self {
        Self {
            manifest: ToolManifest {
                name: "current_time".into(),
                description: "returns the current Unix timestamp in seconds".into(),
                category: ToolCategory::Utility,
                requires_confirmation: false,
                trust_level: TrustLevel::Core,
                security_scope: std::collections::BTreeSet::from([SecurityScope::ReadOnly]),
                resource_profile: ResourceProfile::CpuLight,
                parameters: vec![],
            },
        }
    }
}

impl Default for CurrentTimeTool {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolDyn for CurrentTimeTool {
    fn manifest(&self) -> &ToolManifest {
        &self.manifest
    }

    fn call(&self, _params: serde_json::Value) -> Pin<Box<dyn Future<Output = ToolResult> + Send + '_>> {
        Box::pin(async move {
            let seconds = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            ToolResult::success(serde_json::json!({"unix_seconds": seconds}))
        })
    }
}
