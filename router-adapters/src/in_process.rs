//! In-process backend adapter: prompt rendering + a pluggable inference hook.
//!
//! Loading and running actual model weights is outside this crate's
//! remit (no local-inference runtime crate is part of the dependency
//! stack); what's implemented here is prompt-template rendering,
//! dedicated-worker dispatch, lifecycle, and failure classification
//! against a pluggable [`InferenceBackend`].

use std::fmt;
use std::sync::Arc;

use router_types::RouterError;

use crate::prompt::render_prompt;
use crate::GenerateParams;

/// A pluggable local-inference implementation.
///
/// The in-process adapter never calls this on the async runtime's
/// worker threads directly — `generate` dispatches it via
/// `spawn_blocking` so a slow backend never starves the request
/// scheduler.
pub trait InferenceBackend: Send + Sync {
    /// Run inference over the already-rendered prompt text.
    fn generate_sync(&self, rendered_prompt: &str, max_tokens: u32, temperature: f32) -> Result<String, RouterError>;
}

impl fmt::Debug for dyn InferenceBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn InferenceBackend")
    }
}

/// A deterministic stand-in backend used when no real runtime is wired,
/// and in tests. Echoes a bounded slice of the rendered prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoBackend;

impl InferenceBackend for EchoBackend {
    fn generate_sync(&self, rendered_prompt: &str, max_tokens: u32, _temperature: f32) -> Result<String, RouterError> {
        let cap = (max_tokens as usize).max(1) * 4;
        let echoed: String = rendered_prompt.chars().rev().take(cap.min(256)).collect();
        Ok(format!("[in-process echo] {echoed}"))
    }
}

/// In-process model adapter: renders prompts per `prompt_format_tag`
/// and dispatches generation to an [`InferenceBackend`].
#[derive(Clone)]
pub struct InProcessAdapter {
    model_path: String,
    prompt_format_tag: String,
    backend: Arc<dyn InferenceBackend>,
    loaded: Arc<std::sync::atomic::AtomicBool>,
}

impl InProcessAdapter {
    /// Build an adapter for the given artifact path and format tag.
    #[must_use]
    pub fn new(model_path: impl Into<String>, prompt_format_tag: impl Into<String>, backend: Arc<dyn InferenceBackend>) -> Self {
        Self {
            model_path: model_path.into(),
            prompt_format_tag: prompt_format_tag.into(),
            backend,
            loaded: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        }
    }

    /// Mark the artifact as loaded. A real runtime would mmap/parse the
    /// weights here; this crate has no such runtime to ground that on,
    /// so initialization is a liveness flag plus a path-existence check.
    pub async fn initialize(&self) -> Result<(), RouterError> {
        let path = self.model_path.clone();
        let exists = tokio::task::spawn_blocking(move || std::path::Path::new(&path).exists())
            .await
            .map_err(|e| RouterError::internal(format!("initialize worker panicked: {e}")))?;
        if !exists {
            return Err(RouterError::model_unavailable("model artifact not found at configured path"));
        }
        self.loaded.store(true, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }

    /// Whether the artifact has been loaded.
    pub async fn is_available(&self) -> bool {
        self.loaded.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Unload. Idempotent.
    pub async fn close(&self) {
        self.loaded.store(false, std::sync::atomic::Ordering::SeqCst);
    }

    /// Render the prompt and run inference on a dedicated blocking worker.
    pub async fn generate(&self, params: &GenerateParams) -> Result<String, RouterError> {
        let system = params.system.as_deref().unwrap_or("");
        let rendered = render_prompt(&self.prompt_format_tag, system, &params.prompt);
        let backend = Arc::clone(&self.backend);
        let max_tokens = params.max_tokens;
        let temperature = params.temperature;

        tracing::debug!(model_path = %self.model_path, format_tag = %self.prompt_format_tag, "dispatching in-process generation");

        tokio::task::spawn_blocking(move || backend.generate_sync(&rendered, max_tokens, temperature))
            .await
            .map_err(|e| RouterError::internal(format!("inference worker panicked: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn initialize_fails_when_artifact_missing() {
        let adapter = InProcessAdapter::new("/nonexistent/path/model.bin", "GenericTurn", Arc::new(EchoBackend));
        let result = adapter.initialize().await;
        assert!(result.is_err());
        assert!(!adapter.is_available().await);
    }

    #[tokio::test]
    async fn initialize_succeeds_and_generate_renders_prompt() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let adapter = InProcessAdapter::new(file.path().to_str().unwrap(), "GenericTurn", Arc::new(EchoBackend));
        adapter.initialize().await.unwrap();
        assert!(adapter.is_available().await);

        let params = GenerateParams {
            prompt: "hello".into(),
            system: None,
            temperature: 0.7,
            max_tokens: 16,
        };
        let text = adapter.generate(&params).await.unwrap();
        assert!(text.starts_with("[in-process echo]"));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let adapter = InProcessAdapter::new("x", "GenericTurn", Arc::new(EchoBackend));
        adapter.close().await;
        adapter.close().await;
        assert!(!adapter.is_available().await);
    }
}
