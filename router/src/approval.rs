//! Built-in [`ApprovalGate`] implementations.
//!
//! The gate is "typically implemented by the chat interface" per the
//! tool framework's design; this binary ships two gates suited to a
//! headless/CLI composition root rather than a chat front-end.

use std::future::Future;
use std::pin::Pin;

use router_tool::{ApprovalDecision, ApprovalGate, ToolCall, ToolContext};

/// Approves every call unconditionally. Suited to trusted, offline, or
/// scripted deployments where no human is in the loop.
#[derive(Debug, Default)]
pub struct AutoApproveGate;

impl ApprovalGate for AutoApproveGate {
    fn request<'a>(
        &'a self,
        _call: &'a ToolCall,
        _ctx: &'a ToolContext,
    ) -> Pin<Box<dyn Future<Output = ApprovalDecision> + Send + 'a>> {
        Box::pin(async { ApprovalDecision::Approved })
    }
}

/// Denies every call unconditionally. Suited to a deployment mode where
/// confirmation-gated tools are disabled rather than interactively approved.
#[derive(Debug, Default)]
pub struct AutoDenyGate;

impl ApprovalGate for AutoDenyGate {
    fn request<'a>(
        &'a self,
        _call: &'a ToolCall,
        _ctx: &'a ToolContext,
    ) -> Pin<Box<dyn Future<Output = ApprovalDecision> + Send + 'a>> {
        Box::pin(async { ApprovalDecision::Denied })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call() -> ToolCall {
        ToolCall {
            id: "1".into(),
            name: "echo".into(),
            params: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn auto_approve_always_approves() {
        let ctx = ToolContext::new("alice");
        assert_eq!(AutoApproveGate.request(&call(), &ctx).await, ApprovalDecision::Approved);
    }

    #[tokio::test]
    async fn auto_deny_always_denies() {
        let ctx = ToolContext::new("alice");
        assert_eq!(AutoDenyGate.request(&call(), &ctx).await, ApprovalDecision::Denied);
    }
}
