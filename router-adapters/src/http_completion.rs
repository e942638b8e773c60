//! OpenAI-compatible HTTP backend adapter (`/chat/completions` + `/models`).
//!
//! Grounded on `neuron-provider-openai`'s request/response shape, same
//! error-mapping discipline as [`crate::http_chat`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use router_types::RouterError;

use crate::error::{map_http_status, map_reqwest_error};
use crate::GenerateParams;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

/// OpenAI-compatible HTTP adapter.
#[derive(Clone)]
pub struct HttpCompletionAdapter {
    base_url: String,
    model_id: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpCompletionAdapter {
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

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.base_url)
    }

    /// No-op.
    pub async fn initialize(&self) -> Result<(), RouterError> {
        Ok(())
    }

    /// No-op.
    pub async fn close(&self) {}

    /// `GET /models` returns 2xx.
    pub async fn is_available(&self) -> bool {
        matches!(
            self.client.get(self.models_url()).timeout(Duration::from_secs(5)).send().await,
            Ok(response) if response.status().is_success()
        )
    }

    /// `POST /chat/completions`; maps `.choices[0].message.content`.
    pub async fn generate(&self, params: &GenerateParams) -> Result<String, RouterError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = params.system.as_deref().filter(|s| !s.is_empty()) {
            messages.push(Message { role: "system", content: system });
        }
        messages.push(Message { role: "user", content: &params.prompt });

        let body = CompletionRequest {
            model: &self.model_id,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            stream: false,
        };

        tracing::debug!(url = %self.completions_url(), model = %self.model_id, "sending completion request");

        let response = self
            .client
            .post(self.completions_url())
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

        let mut parsed: CompletionResponse = serde_json::from_str(&text)
            .map_err(|e| RouterError::backend(format!("malformed completion response body: {e}")))?;
        if parsed.choices.is_empty() {
            return Err(RouterError::backend("completion response had no choices"));
        }
        Ok(parsed.choices.remove(0).message.content)
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
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "hi back"}}]
            })))
            .mount(&server)
            .await;

        let adapter = HttpCompletionAdapter::new(server.uri(), "gpt-oss");
        let result = adapter
            .generate(&GenerateParams {
                prompt: "hi".into(),
                system: None,
                temperature: 0.7,
                max_tokens: 100,
            })
            .await
            .unwrap();
        assert_eq!(result, "hi back");
    }

    #[tokio::test]
    async fn generate_errors_when_choices_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let adapter = HttpCompletionAdapter::new(server.uri(), "gpt-oss");
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
    async fn is_available_true_on_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
            .mount(&server)
            .await;
        let adapter = HttpCompletionAdapter::new(server.uri(), "gpt-oss");
        assert!(adapter.is_available().await);
    }
}
