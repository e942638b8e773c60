#![deny(missing_docs)]
//! Tool contract, validation middleware, and per-tool execution stats.
//!
//! [`ToolDyn`] is the object-safe contract every tool implements, grounded
//! on the neighboring tool-registry crate's `ToolDyn`/`Arc<dyn ToolDyn>`
//! storage idiom. [`ToolPipeline`] wraps one tool instance with its
//! manifest, a fixed ordered chain of [`ToolMiddleware`] stages built the
//! same way as that crate's axum-`from_fn`-shaped `Next`/`tool_middleware_fn`
//! pattern, and running counters.

mod middleware;
mod stats;

pub use middleware::{
    default_chain, ApprovalDecision, ApprovalGate, ConfirmationMiddleware, DefaultsMiddleware,
    Next, RequiredParamsMiddleware, ToolCall, ToolContext, ToolMiddleware, TypeAndRangeMiddleware,
};
pub use stats::ToolStats;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use router_types::{ToolManifest, ToolResult};
use stats::LiveToolStats;

/// Object-safe contract every tool implements.
///
/// Tools are stored as `Arc<dyn ToolDyn>` so the registry can hold a
/// heterogeneous collection behind one type.
pub trait ToolDyn: Send + Sync {
    /// The tool's immutable manifest.
    fn manifest(&self) -> &ToolManifest;

    /// Run the tool body. Parameters have already passed the middleware
    /// chain (required-params, type/range, defaults, confirmation) by
    /// the time this is called.
    fn call(
        &self,
        params: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send + '_>>;
}

/// One tool instance, its fixed validation chain, and its running stats.
pub struct ToolPipeline {
    tool: Arc<dyn ToolDyn>,
    chain: Vec<Arc<dyn ToolMiddleware>>,
    stats: LiveToolStats,
}

impl ToolPipeline {
    /// Wrap `tool` with the default four-stage validation chain.
    #[must_use]
    pub fn new(tool: Arc<dyn ToolDyn>, approval_gate: Arc<dyn ApprovalGate>) -> Self {
        Self {
            tool,
            chain: default_chain(approval_gate),
            stats: LiveToolStats::default(),
        }
    }

    /// Wrap `tool` with an explicit middleware chain, for tests or
    /// deployments that need to reorder or drop stages.
    #[must_use]
    pub fn with_chain(tool: Arc<dyn ToolDyn>, chain: Vec<Arc<dyn ToolMiddleware>>) -> Self {
        Self {
            tool,
            chain,
            stats: LiveToolStats::default(),
        }
    }

    /// The wrapped tool's manifest.
    #[must_use]
    pub fn manifest(&self) -> &ToolManifest {
        self.tool.manifest()
    }

    /// Accumulated execution counters.
    #[must_use]
    pub fn stats(&self) -> ToolStats {
        self.stats.snapshot()
    }

    /// The wrapped tool, for callers that need direct access (e.g. `ListTools`).
    #[must_use]
    pub fn tool(&self) -> &Arc<dyn ToolDyn> {
        &self.tool
    }

    /// Run `call` through the validation chain and, if it survives, the
    /// tool body. Only calls that actually reach the tool body are
    /// recorded in `stats` — a call a middleware stage rejects before
    /// `tool.call()` runs leaves the counters untouched.
    pub async fn execute(&self, call: ToolCall, ctx: &ToolContext) -> ToolResult {
        let recorder = RecordingTool {
            inner: self.tool.as_ref(),
            invoked: std::sync::atomic::AtomicBool::new(false),
        };
        let next = Next::new(&recorder, &self.chain);
        let result = next.run(call, ctx).await;
        if recorder.invoked.load(std::sync::atomic::Ordering::Relaxed) {
            self.stats.record(result.success);
        }
        result
    }
}

/// Wraps the pipeline's tool for one call so `execute` can tell whether
/// the chain ever reached the body, without touching `ToolDyn` itself.
struct RecordingTool<'a> {
    inner: &'a dyn ToolDyn,
    invoked: std::sync::atomic::AtomicBool,
}

impl ToolDyn for RecordingTool<'_> {
    fn manifest(&self) -> &ToolManifest {
        self.inner.manifest()
    }

    fn call(
        &self,
        params: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send + '_>> {
        self.invoked.store(true, std::sync::atomic::Ordering::Relaxed);
        self.inner.call(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_types::{ErrorKind, ParameterSpec, ParameterType, ResourceProfile, SecurityScope, ToolCategory, TrustLevel};
    use std::collections::BTreeSet;

    struct EchoTool {
        manifest: ToolManifest,
    }

    impl EchoTool {
        fn new() -> Self {
            Self {
                manifest: ToolManifest {
                    name: "echo".into(),
                    description: "echoes its `text` parameter".into(),
                    category: ToolCategory::Utility,
                    requires_confirmation: false,
                    trust_level: TrustLevel::Core,
                    security_scope: BTreeSet::from([SecurityScope::ReadOnly]),
                    resource_profile: ResourceProfile::CpuLight,
                    parameters: vec![ParameterSpec::required("text", ParameterType::String, "text to echo")],
                },
            }
        }
    }

    impl ToolDyn for EchoTool {
        fn manifest(&self) -> &ToolManifest {
            &self.manifest
        }

        fn call(&self, params: serde_json::Value) -> Pin<Box<dyn Future<Output = ToolResult> + Send + '_>> {
            Box::pin(async move { ToolResult::success(params) })
        }
    }

    struct AlwaysApprove;
    impl ApprovalGate for AlwaysApprove {
        fn request<'a>(
            &'a self,
            _call: &'a ToolCall,
            _ctx: &'a ToolContext,
        ) -> Pin<Box<dyn Future<Output = ApprovalDecision> + Send + 'a>> {
            Box::pin(async { ApprovalDecision::Approved })
        }
    }

    fn call(params: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "c1".into(),
            name: "echo".into(),
            params,
        }
    }

    #[tokio::test]
    async fn valid_call_reaches_the_tool_body() {
        let pipeline = ToolPipeline::new(Arc::new(EchoTool::new()), Arc::new(AlwaysApprove));
        let ctx = ToolContext::new("alice");
        let result = pipeline.execute(call(serde_json::json!({"text": "hi"})), &ctx).await;
        assert!(result.success);
        assert_eq!(pipeline.stats().executions, 1);
        assert_eq!(pipeline.stats().errors, 0);
    }

    #[tokio::test]
    async fn missing_required_param_short_circuits_before_the_tool_body() {
        let pipeline = ToolPipeline::new(Arc::new(EchoTool::new()), Arc::new(AlwaysApprove));
        let ctx = ToolContext::new("alice");
        let result = pipeline.execute(call(serde_json::json!({})), &ctx).await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::Validation));
        assert_eq!(pipeline.stats().executions, 0);
        assert_eq!(pipeline.stats().errors, 0);
    }
}
