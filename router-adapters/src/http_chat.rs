//! Chat-style HTTP backend adapter (Ollama-shaped `/api/chat` + `/api/tags`).
//!
//! Grounded on `neuron-provider-ollama`'s client: same request/response
//! shape, same "build body, post, map status, decode" flow, retargeted
//! at the router's `RouterError`/`ErrorKind` taxonomy instead of
//! `ProviderError`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use router_types::RouterError;

use crate::error::{map_http_status, map_reqwest_error};
use crate::GenerateParams;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct TagsEntry {
    name: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<TagsEntry>,
}

/// Chat-style HTTP adapter over a base URL, holding a shared `reqwest::Client`.
#[derive(Clone)]
pub struct HttpChatAdapter {
    base_url: String,
    model_id: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpChatAdapter {
    /// Build an adapter for `model_id` served at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model_id: model_id.into(),
            client: reqwest::Client::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the default 60s request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.base_url)
    }

    /// No-op: the HTTP client is ready to use as soon as it's built.
    pub async fn initialize(&self) -> Result<(), RouterError> {
        Ok(())
    }

    /// Tear down. `reqwest::Client` has no explicit close; dropping the
    /// last clone releases its connection pool.
    pub async fn close(&self) {}

    /// `GET /api/tags` within 5s; succeeds iff `self.model_id` appears.
    pub async fn is_available(&self) -> bool {
        let Ok(response) = self
            .client
            .get(self.tags_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        else {
            return false;
        };
        if !response.status().is_success() {
            return false;
        }
        let Ok(tags) = response.json::<TagsResponse>().await else {
            return false;
        };
        tags.models.iter().any(|m| m.name == self.model_id)
    }

    /// `POST /api/chat` with `stream:false`; maps `.message.content`.
    pub async fn generate(&self, params: &GenerateParams) -> Result<String, RouterError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = params.system.as_deref().filter(|s| !s.is_empty()) {
            messages.push(ChatMessage { role: "system", content: system });
        }
        messages.push(ChatMessage { role: "user", content: &params.prompt });

        let body = ChatRequest {
            model: &self.model_id,
            messages,
            stream: false,
            options: ChatOptions {
                temperature: params.temperature,
                num_predict: params.max_tokens,
            },
        };

        tracing::debug!(url = %self.chat_url(), model = %self.model_id, "sending chat request");

        let response = self
            .client
            .post(self.chat_url())
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            return Err(map_http_status(status, &text));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| RouterError::backend(format!("malformed chat response body: {e}")))?;
        Ok(parsed.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn generate_maps_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": {"content": "hello there"}
            })))
            .mount(&server)
            .await;

        let adapter = HttpChatAdapter::new(server.uri(), "llama3.2");
        let result = adapter
            .generate(&GenerateParams {
                prompt: "hi".into(),
                system: None,
                temperature: 0.7,
                max_tokens: 100,
            })
            .await
            .unwrap();
        assert_eq!(result, "hello there");
    }

    #[tokio::test]
    async fn generate_maps_5xx_to_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let adapter = HttpChatAdapter::new(server.uri(), "llama3.2");
        let err = adapter
            .generate(&GenerateParams {
                prompt: "hi".into(),
                system: None,
                temperature: 0.7,
                max_tokens: 100,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, router_types::ErrorKind::Backend);
    }

    #[tokio::test]
    async fn is_available_true_when_model_listed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{"name": "llama3.2"}]
            })))
            .mount(&server)
            .await;

        let adapter = HttpChatAdapter::new(server.uri(), "llama3.2");
        assert!(adapter.is_available().await);
    }

    #[tokio::test]
    async fn is_available_false_when_model_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{"name": "other-model"}]
            })))
            .mount(&server)
            .await;

        let adapter = HttpChatAdapter::new(server.uri(), "llama3.2");
        assert!(!adapter.is_available().await);
    }
}
