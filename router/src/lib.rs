#![deny(missing_docs)]
//! Composition root: configuration, the built-in approval gates, and the
//! `RouteAndExecute`/`ExecuteTool` facade assembled from every other crate
//! in the workspace.

mod approval;
mod config;
mod facade;

pub use approval::{AutoApproveGate, AutoDenyGate};
pub use config::{ConfigError, ModelConfigEntry, RouterConfig};
pub use facade::{EngineStatsSnapshot, ExecuteToolOptions, Facade, ModelSummary, RouteOptions};

use std::sync::Arc;

use router_engine::ExecutionEngine;
use router_registry::ModelRegistry;
use router_security::{RateLimiter, Sanitizer};
use router_tool::ApprovalGate;
use router_tool_registry::{LoadReport, ToolRegistry};

/// Build registry → engine → tool registry → security middleware →
/// facade, in that order, from `config`.
///
/// # Errors
/// Returns a [`ConfigError`] if any `models` entry fails descriptor
/// validation or resolves to no backend address.
pub fn build(config: &RouterConfig, approval_gate: Arc<dyn ApprovalGate>) -> Result<(Facade, LoadReport), ConfigError> {
    let descriptors = config.build_descriptors()?;
    let registry = ModelRegistry::new(descriptors);
    let engine = ExecutionEngine::new(registry);

    let (tools, load_report) = ToolRegistry::discover(&config.tool_root, Arc::clone(&approval_gate));

    let rate_limiter = RateLimiter::new(config.rate_limit_messages, config.rate_limit_window_seconds);
    let sanitizer = Sanitizer::new(config.sanitizer_allowed_url_schemes.clone(), config.sanitizer_suspicious_domains.clone());

    let facade = Facade::new(
        engine,
        tools,
        rate_limiter,
        sanitizer,
        approval_gate,
        config.tools_require_confirmation,
        config.default_request_deadline_seconds,
    );

    Ok((facade, load_report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_succeeds_over_an_empty_config() {
        let config = RouterConfig::default();
        let (facade, report) = build(&config, Arc::new(AutoApproveGate)).unwrap();
        assert!(facade.list_models().is_empty());
        assert_eq!(report.loaded_count, 0);
    }
}
