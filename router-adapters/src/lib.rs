#![deny(missing_docs)]
//! Backend adapters: a closed, variant-dispatched set of transports.
//!
//! Per the design note on dynamic dispatch, new backends are added by
//! extending [`Adapter`]'s variant set, not by introducing a `dyn Trait`
//! hierarchy — the execution engine always matches on a concrete,
//! enumerable shape.

mod error;
mod http_chat;
mod http_completion;
mod in_process;
mod prompt;

pub use http_chat::HttpChatAdapter;
pub use http_completion::HttpCompletionAdapter;
pub use in_process::{EchoBackend, InferenceBackend, InProcessAdapter};
pub use prompt::render_prompt;

use router_types::RouterError;

/// The parameters a `generate` call takes, independent of backend.
#[derive(Debug, Clone)]
pub struct GenerateParams {
    /// The user-turn text.
    pub prompt: String,
    /// Optional system-turn text.
    pub system: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// One initialized backend, wrapping exactly one transport variant.
#[derive(Clone)]
pub enum Adapter {
    /// Ollama-shaped chat API.
    HttpChat(HttpChatAdapter),
    /// OpenAI-compatible completion API.
    HttpCompletion(HttpCompletionAdapter),
    /// In-process model artifact.
    InProcess(InProcessAdapter),
}

impl Adapter {
    /// Prepare the adapter for use. No-op for the HTTP variants; checks
    /// artifact presence for the in-process variant.
    pub async fn initialize(&self) -> Result<(), RouterError> {
        match self {
            Self::HttpChat(a) => a.initialize().await,
            Self::HttpCompletion(a) => a.initialize().await,
            Self::InProcess(a) => a.initialize().await,
        }
    }

    /// Tear down and release any held transport resources.
    pub async fn close(&self) {
        match self {
            Self::HttpChat(a) => a.close().await,
            Self::HttpCompletion(a) => a.close().await,
            Self::InProcess(a) => a.close().await,
        }
    }

    /// Liveness probe, per the variant's backend protocol.
    pub async fn is_available(&self) -> bool {
        match self {
            Self::HttpChat(a) => a.is_available().await,
            Self::HttpCompletion(a) => a.is_available().await,
            Self::InProcess(a) => a.is_available().await,
        }
    }

    /// Generate text. A 60-second timeout is enforced by the
    /// caller (the adapter pool/engine) via `tokio::time::timeout`,
    /// keeping the timeout policy in one place rather than duplicated
    /// per variant.
    pub async fn generate(&self, params: &GenerateParams) -> Result<String, RouterError> {
        match self {
            Self::HttpChat(a) => a.generate(params).await,
            Self::HttpCompletion(a) => a.generate(params).await,
            Self::InProcess(a) => a.generate(params).await,
        }
    }
}

/// Run `generate` under the default 60-second request timeout,
/// translating a deadline miss into a `Timeout` failure and documenting
/// that the underlying connection must be released — `reqwest`/the
/// in-process worker both drop their in-flight work when the `timeout`
/// future is cancelled, which releases the connection/worker slot.
pub async fn generate_with_timeout(
    adapter: &Adapter,
    params: &GenerateParams,
    timeout: std::time::Duration,
) -> Result<String, RouterError> {
    match tokio::time::timeout(timeout, adapter.generate(params)).await {
        Ok(result) => result,
        Err(_) => Err(RouterError::timeout(format!("adapter call exceeded {timeout:?}"))),
    }
}

/// The default request timeout.
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn timeout_wrapper_converts_elapsed_to_timeout_error() {
        let adapter = Adapter::InProcess(InProcessAdapter::new(
            "/nonexistent",
            "GenericTurn",
            Arc::new(SlowBackend),
        ));
        let params = GenerateParams {
            prompt: "hi".into(),
            system: None,
            temperature: 0.7,
            max_tokens: 10,
        };
        let result = generate_with_timeout(&adapter, &params, std::time::Duration::from_millis(10)).await;
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind, router_types::ErrorKind::Timeout);
    }

    struct SlowBackend;
    impl InferenceBackend for SlowBackend {
        fn generate_sync(&self, _prompt: &str, _max_tokens: u32, _temperature: f32) -> Result<String, RouterError> {
            std::thread::sleep(std::time::Duration::from_millis(200));
            Ok("late".into())
        }
    }
}
