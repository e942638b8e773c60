//! Execution engine: classify, route, generate, fall back.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use router_adapters::{generate_with_timeout, GenerateParams, DEFAULT_TIMEOUT};
use router_classifier::Classifier;
use router_registry::ModelRegistry;
use router_types::{ErrorKind, ExecutionResult, ModelDescriptor, RouterError};

use crate::pool::AdapterPool;
use crate::router::{Router, RoutingOptions};

/// Per-call overrides accepted by [`ExecutionEngine::execute`].
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Optional system prompt.
    pub system_prompt: Option<String>,
    /// Routing preferences.
    pub routing: RoutingOptions,
    /// Per-call timeout override; defaults to 60s.
    pub timeout: std::time::Duration,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
            system_prompt: None,
            routing: RoutingOptions::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Legacy backends signal in-band failure with this text prefix rather
/// than a transport-level error; the engine must still classify it as a
/// failed attempt.
const LEGACY_FAILURE_SENTINEL: &str = "Error:";

/// Per-model execution counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModelStats {
    /// Attempts made against this model.
    pub executions: u64,
    /// Attempts that succeeded.
    pub successes: u64,
    /// Attempts that failed.
    pub failures: u64,
    /// Cumulative wall-clock seconds spent on this model.
    pub cumulative_elapsed_seconds: f64,
}

impl ModelStats {
    /// `successes / executions`, or `0.0` when there have been no attempts.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.executions == 0 {
            0.0
        } else {
            self.successes as f64 / self.executions as f64
        }
    }

    /// `cumulative_elapsed_seconds / executions`, or `0.0` when empty.
    #[must_use]
    pub fn average_elapsed_seconds(&self) -> f64 {
        if self.executions == 0 {
            0.0
        } else {
            self.cumulative_elapsed_seconds / self.executions as f64
        }
    }
}

/// Engine-wide execution counters.
#[derive(Debug, Default)]
pub struct EngineStats {
    executions: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    fallbacks: AtomicU64,
    parallel_invocations: AtomicU64,
    cumulative_elapsed_bits: AtomicU64,
    per_model: Mutex<HashMap<String, ModelStats>>,
}

impl EngineStats {
    /// Total executions attempted.
    pub fn executions(&self) -> u64 {
        self.executions.load(Ordering::Relaxed)
    }

    /// Total successful executions.
    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    /// Total failed executions.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Total fallback attempts taken.
    pub fn fallbacks(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    /// Total `ExecuteParallel` invocations.
    pub fn parallel_invocations(&self) -> u64 {
        self.parallel_invocations.load(Ordering::Relaxed)
    }

    /// Cumulative wall-clock seconds across every execution.
    pub fn cumulative_elapsed_seconds(&self) -> f64 {
        f64::from_bits(self.cumulative_elapsed_bits.load(Ordering::Relaxed))
    }

    /// `successes / executions`, or `0.0` when there have been no executions.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let total = self.executions();
        if total == 0 {
            0.0
        } else {
            self.successes() as f64 / total as f64
        }
    }

    /// `cumulative_elapsed_seconds / executions`, or `0.0` when empty.
    #[must_use]
    pub fn average_elapsed_seconds(&self) -> f64 {
        let total = self.executions();
        if total == 0 {
            0.0
        } else {
            self.cumulative_elapsed_seconds() / total as f64
        }
    }

    /// Snapshot of per-model counters.
    #[must_use]
    pub fn per_model(&self) -> HashMap<String, ModelStats> {
        self.per_model.lock().clone()
    }

    fn record_attempt(&self, model_id: &str, success: bool, elapsed: f64) {
        self.executions.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
        add_f64(&self.cumulative_elapsed_bits, elapsed);

        let mut guard = self.per_model.lock();
        let entry = guard.entry(model_id.to_string()).or_default();
        entry.executions += 1;
        if success {
            entry.successes += 1;
        } else {
            entry.failures += 1;
        }
        entry.cumulative_elapsed_seconds += elapsed;
    }

    fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    fn record_parallel_invocation(&self) {
        self.parallel_invocations.fetch_add(1, Ordering::Relaxed);
    }
}

/// `f64` has no atomic type; counters are stored as the bit pattern of
/// the running total and updated under a compare-exchange retry loop.
fn add_f64(slot: &AtomicU64, delta: f64) {
    let mut current = slot.load(Ordering::Relaxed);
    loop {
        let next = f64::from_bits(current) + delta;
        match slot.compare_exchange_weak(current, next.to_bits(), Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return,
            Err(observed) => current = observed,
        }
    }
}

/// Classify → route → generate, with at most one fallback attempt.
pub struct ExecutionEngine {
    registry: ModelRegistry,
    router: Router,
    pool: Arc<AdapterPool>,
    classifier: Classifier,
    stats: Arc<EngineStats>,
}

impl ExecutionEngine {
    /// Build an engine over an already-populated registry.
    #[must_use]
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            registry,
            router: Router::new(),
            pool: Arc::new(AdapterPool::new()),
            classifier: Classifier::default(),
            stats: Arc::new(EngineStats::default()),
        }
    }

    /// The underlying model registry.
    #[must_use]
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// The underlying router, for inspecting `RouterStats`.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Accumulated engine statistics.
    #[must_use]
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Tear down every adapter the pool has constructed.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Classify `request_text`, route it, generate once, and fall back
    /// at most once on `Backend`/`Timeout` failure.
    pub async fn execute(&self, request_text: &str, options: &ExecuteOptions) -> ExecutionResult {
        let start = Instant::now();
        let classification = self.classifier.classify(request_text);

        let Some(descriptor) = self.router.route(&self.registry, &classification, &options.routing) else {
            return ExecutionResult::failure(
                "",
                start.elapsed().as_secs_f64(),
                ErrorKind::ModelUnavailable,
                "no candidate model satisfied the routing constraints",
                false,
            );
        };

        let (_primary_elapsed, primary_outcome) = self.attempt(&descriptor, request_text, options).await;

        match primary_outcome {
            Ok(text) => ExecutionResult {
                success: true,
                response_text: text,
                model_id: descriptor.id.clone(),
                elapsed_seconds: start.elapsed().as_secs_f64(),
                error_kind: None,
                error_message: None,
                fallback_used: false,
            },
            Err(err) if err.is_retryable() => {
                if let Some(fallback) = self.router.fallback_candidate(&self.registry, &descriptor) {
                    self.stats.record_fallback();
                    let (_, fallback_outcome) = self.attempt(&fallback, request_text, options).await;
                    match fallback_outcome {
                        Ok(text) => ExecutionResult {
                            success: true,
                            response_text: text,
                            model_id: fallback.id.clone(),
                            elapsed_seconds: start.elapsed().as_secs_f64(),
                            error_kind: None,
                            error_message: None,
                            fallback_used: true,
                        },
                        Err(fallback_err) => ExecutionResult {
                            success: false,
                            response_text: String::new(),
                            model_id: fallback.id.clone(),
                            elapsed_seconds: start.elapsed().as_secs_f64(),
                            error_kind: Some(fallback_err.kind),
                            error_message: Some(fallback_err.message),
                            fallback_used: true,
                        },
                    }
                } else {
                    ExecutionResult {
                        success: false,
                        response_text: String::new(),
                        model_id: descriptor.id.clone(),
                        elapsed_seconds: start.elapsed().as_secs_f64(),
                        error_kind: Some(err.kind),
                        error_message: Some(err.message),
                        fallback_used: false,
                    }
                }
            }
            Err(err) => ExecutionResult {
                success: false,
                response_text: String::new(),
                model_id: descriptor.id.clone(),
                elapsed_seconds: start.elapsed().as_secs_f64(),
                error_kind: Some(err.kind),
                error_message: Some(err.message),
                fallback_used: false,
            },
        }
    }

    /// Dispatch to each of `model_ids` concurrently; individual failures
    /// do not cancel peers. Output order matches `model_ids`.
    pub async fn execute_parallel(&self, request_text: &str, model_ids: &[String], options: &ExecuteOptions) -> Vec<ExecutionResult> {
        self.stats.record_parallel_invocation();

        let mut handles = Vec::with_capacity(model_ids.len());
        for model_id in model_ids {
            let descriptor = self.registry.get(model_id);
            let request_text = request_text.to_string();
            let options = options.clone();
            let pool = Arc::clone(&self.pool);
            let stats = Arc::clone(&self.stats);
            let model_id = model_id.clone();

            handles.push(tokio::spawn(async move {
                let Some(descriptor) = descriptor else {
                    return ExecutionResult::failure(model_id.clone(), 0.0, ErrorKind::ModelUnavailable, format!("unknown model id: {model_id}"), false);
                };
                let (elapsed, outcome) = attempt_with(&pool, &stats, &descriptor, &request_text, &options).await;
                match outcome {
                    Ok(text) => ExecutionResult {
                        success: true,
                        response_text: text,
                        model_id: descriptor.id,
                        elapsed_seconds: elapsed,
                        error_kind: None,
                        error_message: None,
                        fallback_used: false,
                    },
                    Err(err) => ExecutionResult {
                        success: false,
                        response_text: String::new(),
                        model_id: descriptor.id,
                        elapsed_seconds: elapsed,
                        error_kind: Some(err.kind),
                        error_message: Some(err.message),
                        fallback_used: false,
                    },
                }
            }));
        }

        // Output order matches the input order; a panicking attempt is
        // reported as an Internal-classed failure rather than propagated,
        // mirroring `dispatch_many`'s JoinError handling.
        let mut results = Vec::with_capacity(handles.len());
        for (model_id, handle) in model_ids.iter().zip(handles) {
            let result = handle.await.unwrap_or_else(|join_err| {
                ExecutionResult::failure(model_id.clone(), 0.0, ErrorKind::Internal, format!("{model_id} attempt panicked: {join_err}"), false)
            });
            results.push(result);
        }
        results
    }

    /// Try `model_ids` in order; return the first success. If none
    /// succeed, return the last failure with `fallback_used=true`.
    pub async fn execute_chain(&self, request_text: &str, model_ids: &[String], options: &ExecuteOptions) -> ExecutionResult {
        let start = Instant::now();
        let mut last_failure: Option<ExecutionResult> = None;

        for model_id in model_ids {
            let Some(descriptor) = self.registry.get(model_id) else {
                last_failure = Some(ExecutionResult::failure(
                    model_id.clone(),
                    start.elapsed().as_secs_f64(),
                    ErrorKind::ModelUnavailable,
                    format!("unknown model id: {model_id}"),
                    last_failure.is_some(),
                ));
                continue;
            };

            let (_, outcome) = self.attempt(&descriptor, request_text, options).await;
            match outcome {
                Ok(text) => {
                    return ExecutionResult {
                        success: true,
                        response_text: text,
                        model_id: descriptor.id,
                        elapsed_seconds: start.elapsed().as_secs_f64(),
                        error_kind: None,
                        error_message: None,
                        fallback_used: last_failure.is_some(),
                    };
                }
                Err(err) => {
                    last_failure = Some(ExecutionResult {
                        success: false,
                        response_text: String::new(),
                        model_id: descriptor.id,
                        elapsed_seconds: start.elapsed().as_secs_f64(),
                        error_kind: Some(err.kind),
                        error_message: Some(err.message),
                        fallback_used: true,
                    });
                }
            }
        }

        last_failure.unwrap_or_else(|| {
            ExecutionResult::failure("", start.elapsed().as_secs_f64(), ErrorKind::ModelUnavailable, "empty model id chain", false)
        })
    }

    /// Probe every registered model's availability; adapters that fail
    /// to initialize are reported as unavailable rather than propagating.
    pub async fn health_check(&self) -> HashMap<String, bool> {
        let mut result = HashMap::new();
        for descriptor in self.registry.all() {
            let healthy = match self.pool.acquire(&descriptor).await {
                Ok(adapter) => adapter.is_available().await,
                Err(_) => false,
            };
            result.insert(descriptor.id, healthy);
        }
        result
    }

    async fn attempt(&self, descriptor: &ModelDescriptor, request_text: &str, options: &ExecuteOptions) -> (f64, Result<String, RouterError>) {
        attempt_with(&self.pool, &self.stats, descriptor, request_text, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_types::{BackendAddress, Capability, SpeedClass};
    use std::collections::BTreeSet;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[allow(clippy::too_many_arguments)]
    fn http_chat_descriptor(id: &str, base_url: String, speed: SpeedClass, cost: f32, quality_code: f32, capabilities: BTreeSet<Capability>) -> ModelDescriptor {
        ModelDescriptor::new(
            id,
            router_types::BackendKind::HttpChat,
            id,
            "7B",
            "Q4",
            capabilities,
            speed,
            8192,
            Some(20),
            8,
            0.5,
            quality_code,
            0.5,
            cost,
            BackendAddress::Network { url: base_url },
        )
        .unwrap()
    }

    // `HttpChatAdapter::is_available` only checks that the model id is
    // listed in `/api/tags` if the tags response is non-empty; an empty
    // `models` array means it never finds a match, so `is_available`
    // would report false and the engine would never reach `generate`.
    // Mount a tags response containing the model id instead.
    async fn mount_chat_ok_for(server: &MockServer, model_id: &str, reply_text: &str) {
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{ "name": model_id }]
            })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": { "content": reply_text }
            })))
            .mount(server)
            .await;
    }

    async fn mount_chat_failure_for(server: &MockServer, model_id: &str) {
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{ "name": model_id }]
            })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn trivial_greeting_routes_to_the_ultra_fast_candidate() {
        let server = MockServer::start().await;
        mount_chat_ok_for(&server, "ultra", "hello yourself").await;

        let registry = ModelRegistry::new(vec![
            http_chat_descriptor("ultra", server.uri(), SpeedClass::UltraFast, 0.2, 0.5, BTreeSet::from([Capability::General])),
            http_chat_descriptor("slow", "http://127.0.0.1:1".into(), SpeedClass::Slow, 0.2, 0.5, BTreeSet::from([Capability::General])),
        ]);
        let engine = ExecutionEngine::new(registry);

        let result = engine.execute("hi", &ExecuteOptions::default()).await;

        assert!(result.success);
        assert_eq!(result.model_id, "ultra");
        assert!(!result.fallback_used);
        assert!(!result.response_text.is_empty());
    }

    #[tokio::test]
    async fn complex_code_request_maximizes_quality_code_above_the_threshold() {
        let server = MockServer::start().await;
        mount_chat_ok_for(&server, "strong_coder", "here is fibonacci").await;

        let registry = ModelRegistry::new(vec![
            http_chat_descriptor(
                "weak_coder",
                "http://127.0.0.1:1".into(),
                SpeedClass::Fast,
                0.3,
                0.6,
                BTreeSet::from([Capability::Code, Capability::General]),
            ),
            http_chat_descriptor("strong_coder", server.uri(), SpeedClass::Fast, 0.3, 0.9, BTreeSet::from([Capability::Code, Capability::General])),
        ]);
        let engine = ExecutionEngine::new(registry);

        let text = "please write a python function, then test it thoroughly and explain why it works";
        let result = engine.execute(text, &ExecuteOptions::default()).await;

        assert!(result.success);
        assert_eq!(result.model_id, "strong_coder");
        assert!(!result.fallback_used);
    }

    #[tokio::test]
    async fn backend_failure_on_the_primary_candidate_falls_back_to_a_healthy_one() {
        let primary = MockServer::start().await;
        mount_chat_failure_for(&primary, "a").await;
        let backup = MockServer::start().await;
        mount_chat_ok_for(&backup, "b", "fallback reply").await;

        let registry = ModelRegistry::new(vec![
            http_chat_descriptor("a", primary.uri(), SpeedClass::UltraFast, 0.2, 0.5, BTreeSet::from([Capability::General])),
            http_chat_descriptor("b", backup.uri(), SpeedClass::Fast, 0.2, 0.5, BTreeSet::from([Capability::General])),
        ]);
        let engine = ExecutionEngine::new(registry);

        let options = ExecuteOptions {
            routing: RoutingOptions { strategy: crate::router::Strategy::Speed, ..Default::default() },
            ..Default::default()
        };
        let result = engine.execute("what's the weather like today", &options).await;

        assert!(result.success);
        assert_eq!(result.model_id, "b");
        assert!(result.fallback_used);
        assert_eq!(engine.stats().fallbacks(), 1);
    }

    #[tokio::test]
    async fn cost_cap_filtering_out_every_candidate_yields_model_unavailable_with_no_adapter_calls() {
        let registry = ModelRegistry::new(vec![http_chat_descriptor(
            "pricey",
            "http://127.0.0.1:1".into(),
            SpeedClass::Fast,
            0.5,
            0.5,
            BTreeSet::from([Capability::General]),
        )]);
        let engine = ExecutionEngine::new(registry);

        let options = ExecuteOptions {
            routing: RoutingOptions { strategy: crate::router::Strategy::CostOptimized, max_cost: 0.3, ..Default::default() },
            ..Default::default()
        };
        let result = engine.execute("hello there, how are you", &options).await;

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::ModelUnavailable));
        assert_eq!(engine.stats().executions(), 0);
    }
}

async fn attempt_with(
    pool: &AdapterPool,
    stats: &EngineStats,
    descriptor: &ModelDescriptor,
    request_text: &str,
    options: &ExecuteOptions,
) -> (f64, Result<String, RouterError>) {
    let start = Instant::now();

    let outcome = async {
        let adapter = pool.acquire(descriptor).await?;
        if !adapter.is_available().await {
            // A liveness-probe failure on an already-routed candidate is a
            // per-attempt backend problem, not the routing-time "no
            // candidates satisfied the filters" condition `ModelUnavailable`
            // names in the error taxonomy — it must stay retryable so the
            // engine still falls back to an alternate model.
            return Err(RouterError::backend(format!("{} reported unavailable", descriptor.id)));
        }

        let params = GenerateParams {
            prompt: request_text.to_string(),
            system: options.system_prompt.clone(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let text = generate_with_timeout(&adapter, &params, options.timeout).await?;
        if text.is_empty() {
            return Err(RouterError::backend(format!("{} returned an empty response", descriptor.id)));
        }
        if text.starts_with(LEGACY_FAILURE_SENTINEL) {
            return Err(RouterError::backend(format!("{} returned a legacy failure sentinel: {text}", descriptor.id)));
        }
        Ok(text)
    }
    .await;

    let elapsed = start.elapsed().as_secs_f64();
    stats.record_attempt(&descriptor.id, outcome.is_ok(), elapsed);
    (elapsed, outcome)
}

