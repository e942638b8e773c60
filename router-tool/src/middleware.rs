//! Fixed, ordered validation chain run ahead of every tool call.
//!
//! Shaped after the neighboring tool-registry crate's axum-`from_fn`-style
//! middleware: each stage receives the call, the context, and a [`Next`]
//! it can either delegate to or short-circuit by returning a [`ToolResult`]
//! without calling `next.run`. Unlike that crate's user-assembled `Vec`,
//! [`default_chain`] always builds the same four stages in the same
//! order — required params, then type/range, then defaults, then
//! confirmation — because the validation order is part of the contract,
//! not a deployment choice.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use router_types::{ErrorKind, ParameterType, ToolResult};
use tokio_util::sync::CancellationToken;

use crate::ToolDyn;

/// One tool invocation in flight through the validation chain.
#[derive(Debug, Clone)]
pub struct ToolCall {
    /// Caller-assigned identifier for this call (for correlating results).
    pub id: String,
    /// The target tool's name.
    pub name: String,
    /// The call's parameter map, as a JSON object.
    pub params: serde_json::Value,
}

/// Per-call context threaded through the chain: who is calling, and the
/// cancellation signal that a long-running tool body should honor.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// The identity on whose behalf this call is made.
    pub principal: String,
    /// Cooperative cancellation signal for the tool body.
    pub cancellation: CancellationToken,
}

impl ToolContext {
    /// A fresh context for `principal` with its own cancellation token.
    #[must_use]
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            cancellation: CancellationToken::new(),
        }
    }
}

/// The outcome of an [`ApprovalGate`] request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalDecision {
    /// The caller (human or policy) approved the call.
    Approved,
    /// The caller explicitly denied the call.
    Denied,
    /// No decision arrived before the gate's own deadline.
    TimedOut,
}

/// External approval for tools whose manifest sets `requires_confirmation`.
pub trait ApprovalGate: Send + Sync {
    /// Ask for approval of `call`. Implementations may prompt a human,
    /// consult a policy engine, or auto-approve in trusted deployments.
    fn request<'a>(
        &'a self,
        call: &'a ToolCall,
        ctx: &'a ToolContext,
    ) -> Pin<Box<dyn Future<Output = ApprovalDecision> + Send + 'a>>;
}

/// One stage of the validation chain.
pub trait ToolMiddleware: Send + Sync {
    /// Inspect or rewrite `call`, then either short-circuit with a
    /// `ToolResult` or delegate to `next`.
    fn process<'a>(
        &'a self,
        call: ToolCall,
        ctx: &'a ToolContext,
        next: Next<'a>,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send + 'a>>;
}

/// The remaining chain plus the tool at its end. Consumed on `run` to
/// prevent a stage from invoking it twice.
pub struct Next<'a> {
    tool: &'a dyn ToolDyn,
    chain: &'a [Arc<dyn ToolMiddleware>],
}

impl<'a> Next<'a> {
    /// Build a `Next` over the full chain, to start a call from scratch.
    #[must_use]
    pub fn new(tool: &'a dyn ToolDyn, chain: &'a [Arc<dyn ToolMiddleware>]) -> Self {
        Self { tool, chain }
    }

    /// Run the next stage, or the tool body if the chain is exhausted.
    pub fn run(self, call: ToolCall, ctx: &'a ToolContext) -> Pin<Box<dyn Future<Output = ToolResult> + Send + 'a>> {
        match self.chain.split_first() {
            Some((head, tail)) => {
                let next = Next::new(self.tool, tail);
                head.process(call, ctx, next)
            }
            None => self.tool.call(call.params),
        }
    }
}

/// The stage order a compliant tool call always passes through.
#[must_use]
pub fn default_chain(approval_gate: Arc<dyn ApprovalGate>) -> Vec<Arc<dyn ToolMiddleware>> {
    vec![
        Arc::new(RequiredParamsMiddleware),
        Arc::new(TypeAndRangeMiddleware),
        Arc::new(DefaultsMiddleware),
        Arc::new(ConfirmationMiddleware { approval_gate }),
    ]
}

/// Rejects a call missing any parameter the manifest marks `required`.
pub struct RequiredParamsMiddleware;

impl ToolMiddleware for RequiredParamsMiddleware {
    fn process<'a>(
        &'a self,
        call: ToolCall,
        ctx: &'a ToolContext,
        next: Next<'a>,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send + 'a>> {
        Box::pin(async move {
            let object = call.params.as_object();
            for param in next_tool_manifest_params(&next) {
                if param.required && object.is_none_or(|o| !o.contains_key(&param.name)) {
                    return ToolResult::failure(ErrorKind::Validation, format!("missing required parameter `{}`", param.name));
                }
            }
            next.run(call, ctx).await
        })
    }
}

/// Rejects present parameters whose JSON type, enum membership, or
/// numeric range disagrees with the manifest.
pub struct TypeAndRangeMiddleware;

impl ToolMiddleware for TypeAndRangeMiddleware {
    fn process<'a>(
        &'a self,
        call: ToolCall,
        ctx: &'a ToolContext,
        next: Next<'a>,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send + 'a>> {
        Box::pin(async move {
            let object = call.params.as_object().cloned().unwrap_or_default();
            for param in next_tool_manifest_params(&next) {
                let Some(value) = object.get(&param.name) else {
                    continue;
                };
                if !type_matches(value, param.type_tag) {
                    return ToolResult::failure(
                        ErrorKind::Validation,
                        format!("parameter `{}` has the wrong type for {:?}", param.name, param.type_tag),
                    );
                }
                if let Some(values) = &param.enum_values {
                    if let Some(s) = value.as_str() {
                        if !values.iter().any(|v| v == s) {
                            return ToolResult::failure(ErrorKind::Validation, format!("parameter `{}` is not one of the allowed values", param.name));
                        }
                    }
                }
                if let Some(n) = value.as_f64() {
                    if param.min.is_some_or(|min| n < min) || param.max.is_some_or(|max| n > max) {
                        return ToolResult::failure(ErrorKind::Validation, format!("parameter `{}` is out of range", param.name));
                    }
                }
            }
            next.run(call, ctx).await
        })
    }
}

/// Fills in the manifest's default for every optional parameter the
/// caller omitted.
pub struct DefaultsMiddleware;

impl ToolMiddleware for DefaultsMiddleware {
    fn process<'a>(
        &'a self,
        mut call: ToolCall,
        ctx: &'a ToolContext,
        next: Next<'a>,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send + 'a>> {
        Box::pin(async move {
            let mut object = call.params.as_object().cloned().unwrap_or_default();
            for param in next_tool_manifest_params(&next) {
                if !object.contains_key(&param.name) {
                    if let Some(default) = &param.default {
                        object.insert(param.name.clone(), default.clone());
                    }
                }
            }
            call.params = serde_json::Value::Object(object);
            next.run(call, ctx).await
        })
    }
}

/// Consults an [`ApprovalGate`] when the manifest sets `requires_confirmation`.
pub struct ConfirmationMiddleware {
    approval_gate: Arc<dyn ApprovalGate>,
}

impl ToolMiddleware for ConfirmationMiddleware {
    fn process<'a>(
        &'a self,
        call: ToolCall,
        ctx: &'a ToolContext,
        next: Next<'a>,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send + 'a>> {
        Box::pin(async move {
            if next_requires_confirmation(&next) {
                match self.approval_gate.request(&call, ctx).await {
                    ApprovalDecision::Approved => {}
                    ApprovalDecision::Denied => {
                        return ToolResult::failure(ErrorKind::NotAuthorized, "approval denied");
                    }
                    ApprovalDecision::TimedOut => {
                        return ToolResult::failure(ErrorKind::NotAuthorized, "approval timed out");
                    }
                }
            }
            next.run(call, ctx).await
        })
    }
}

fn next_tool_manifest_params(next: &Next<'_>) -> Vec<router_types::ParameterSpec> {
    next.tool.manifest().parameters.clone()
}

fn next_requires_confirmation(next: &Next<'_>) -> bool {
    next.tool.manifest().requires_confirmation
}

fn type_matches(value: &serde_json::Value, type_tag: ParameterType) -> bool {
    match type_tag {
        ParameterType::String | ParameterType::Enum => value.is_string(),
        ParameterType::Integer => value.is_i64() || value.is_u64(),
        ParameterType::Number => value.is_number(),
        ParameterType::Bool => value.is_boolean(),
        ParameterType::Array => value.is_array(),
        ParameterType::Object => value.is_object(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_types::{ParameterSpec, ResourceProfile, SecurityScope, ToolCategory, ToolManifest, TrustLevel};
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubTool {
        manifest: ToolManifest,
    }

    impl ToolDyn for StubTool {
        fn manifest(&self) -> &ToolManifest {
            &self.manifest
        }

        fn call(&self, params: serde_json::Value) -> Pin<Box<dyn Future<Output = ToolResult> + Send + '_>> {
            Box::pin(async move { ToolResult::success(params) })
        }
    }

    fn manifest(requires_confirmation: bool) -> ToolManifest {
        ToolManifest {
            name: "stub".into(),
            description: "test".into(),
            category: ToolCategory::Utility,
            requires_confirmation,
            trust_level: TrustLevel::Core,
            security_scope: BTreeSet::from([SecurityScope::ReadOnly]),
            resource_profile: ResourceProfile::CpuLight,
            parameters: vec![
                ParameterSpec::required("count", ParameterType::Integer, "how many").with_range(1.0, 10.0),
                ParameterSpec::optional("label", ParameterType::String, serde_json::json!("default-label"), "a label"),
            ],
        }
    }

    fn call(params: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "1".into(),
            name: "stub".into(),
            params,
        }
    }

    struct AlwaysApprove(AtomicUsize);
    impl ApprovalGate for AlwaysApprove {
        fn request<'a>(&'a self, _call: &'a ToolCall, _ctx: &'a ToolContext) -> Pin<Box<dyn Future<Output = ApprovalDecision> + Send + 'a>> {
            self.0.fetch_add(1, Ordering::Relaxed);
            Box::pin(async { ApprovalDecision::Approved })
        }
    }

    struct AlwaysDeny;
    impl ApprovalGate for AlwaysDeny {
        fn request<'a>(&'a self, _call: &'a ToolCall, _ctx: &'a ToolContext) -> Pin<Box<dyn Future<Output = ApprovalDecision> + Send + 'a>> {
            Box::pin(async { ApprovalDecision::Denied })
        }
    }

    #[tokio::test]
    async fn out_of_range_parameter_is_rejected() {
        let tool = StubTool { manifest: manifest(false) };
        let chain = default_chain(Arc::new(AlwaysApprove(AtomicUsize::new(0))));
        let ctx = ToolContext::new("p");
        let result = Next::new(&tool, &chain).run(call(serde_json::json!({"count": 99})), &ctx).await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::Validation));
    }

    #[tokio::test]
    async fn missing_optional_parameter_is_defaulted() {
        let tool = StubTool { manifest: manifest(false) };
        let chain = default_chain(Arc::new(AlwaysApprove(AtomicUsize::new(0))));
        let ctx = ToolContext::new("p");
        let result = Next::new(&tool, &chain).run(call(serde_json::json!({"count": 3})), &ctx).await;
        assert!(result.success);
        assert_eq!(result.value.unwrap()["label"], serde_json::json!("default-label"));
    }

    #[tokio::test]
    async fn confirmation_gate_runs_only_when_required() {
        let tool = StubTool { manifest: manifest(false) };
        let gate = Arc::new(AlwaysApprove(AtomicUsize::new(0)));
        let chain = default_chain(gate.clone());
        let ctx = ToolContext::new("p");
        Next::new(&tool, &chain).run(call(serde_json::json!({"count": 3})), &ctx).await;
        assert_eq!(gate.0.load(Ordering::Relaxed), 0);
    }

    struct CountingStubTool {
        manifest: ToolManifest,
        invocations: AtomicUsize,
    }

    impl ToolDyn for CountingStubTool {
        fn manifest(&self) -> &ToolManifest {
            &self.manifest
        }

        fn call(&self, params: serde_json::Value) -> Pin<Box<dyn Future<Output = ToolResult> + Send + '_>> {
            self.invocations.fetch_add(1, Ordering::Relaxed);
            Box::pin(async move { ToolResult::success(params) })
        }
    }

    #[tokio::test]
    async fn missing_required_parameter_is_rejected_before_the_tool_body_runs() {
        let tool = CountingStubTool { manifest: manifest(false), invocations: AtomicUsize::new(0) };
        let chain = default_chain(Arc::new(AlwaysApprove(AtomicUsize::new(0))));
        let ctx = ToolContext::new("p");
        let result = Next::new(&tool, &chain).run(call(serde_json::json!({"label": "x"})), &ctx).await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::Validation));
        assert!(result.error_message.unwrap().contains("count"));
        assert_eq!(tool.invocations.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn denied_confirmation_short_circuits_as_not_authorized() {
        let tool = StubTool { manifest: manifest(true) };
        let chain = default_chain(Arc::new(AlwaysDeny));
        let ctx = ToolContext::new("p");
        let result = Next::new(&tool, &chain).run(call(serde_json::json!({"count": 3})), &ctx).await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::NotAuthorized));
    }
}
