//! Core `ChatModel` trait and `ApiChatModel` implementation.
//!
//! `ApiChatModel` calls any OpenAI-compatible `/v1/chat/completions` endpoint
//! (Groq, OpenAI, Ollama in OpenAI mode, LM Studio, vLLM).
//! All connection details come from [`LlmConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LlmConfig;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur while calling the chat model.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("LLM request timed out")]
    Timeout,

    /// The provider answered with a non-success status.
    #[error("LLM provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP response could not be parsed as JSON.
    #[error("failed to parse LLM response: {0}")]
    Parse(String),

    /// The response JSON had no usable message content.
    #[error("LLM response has no message content: {0}")]
    MissingContent(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Chat messages
// ---------------------------------------------------------------------------

/// Author of a chat-completion message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message of a chat-completion request, in OpenAI wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ChatModel trait
// ---------------------------------------------------------------------------

/// Async trait for chat-completion backends.
///
/// Implementors must be `Send + Sync` so they can be shared across request
/// handlers (e.g. wrapped in `Arc<dyn ChatModel>`).
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send `messages` and return the generated message content.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

// ---------------------------------------------------------------------------
// ApiChatModel
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// # No hardcoded URLs
/// All connection details (`base_url`, `api_key`, `model`) come exclusively
/// from the [`LlmConfig`] passed to [`ApiChatModel::from_config`].
pub struct ApiChatModel {
    client: reqwest::Client,
    config: LlmConfig,
}

impl ApiChatModel {
    /// Build an `ApiChatModel` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails.
    pub fn from_config(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ChatModel for ApiChatModel {
    /// The `Authorization: Bearer …` header is attached **only** when
    /// `config.api_key` is a non-empty string.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let body = serde_json::json!({
            "model":       self.config.model,
            "messages":    messages,
            "stream":      false,
            "temperature": self.config.temperature,
        });

        let mut req = self.client.post(self.endpoint()).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let json: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| LlmError::MissingContent(text.clone()))?;

        if content.trim().is_empty() {
            return Err(LlmError::MissingContent(text));
        }

        Ok(content.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_config(base_url: &str, api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            base_url: base_url.into(),
            api_key: api_key.map(|s| s.to_string()),
            model: "openai/gpt-oss-120b".into(),
            temperature: 0.7,
            timeout_secs: 5,
            persona_file: None,
        }
    }

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
    }

    #[test]
    fn chat_message_serialises_lowercase_role() {
        let json = serde_json::to_value(ChatMessage::system("hi")).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "hi");
    }

    #[test]
    fn model_is_object_safe() {
        let model: Box<dyn ChatModel> =
            Box::new(ApiChatModel::from_config(&make_config("http://localhost:1", None)));
        drop(model);
    }

    #[tokio::test]
    async fn returns_message_content_untrimmed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer gsk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Nice! 😊\n")))
            .expect(1)
            .mount(&server)
            .await;

        let model = ApiChatModel::from_config(&make_config(&server.uri(), Some("gsk-test")));
        let reply = model.complete(&[ChatMessage::user("hello")]).await.unwrap();
        assert_eq!(reply, "Nice! 😊\n");
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let model = ApiChatModel::from_config(&make_config(&server.uri(), None));
        let err = model.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        match err {
            LlmError::Status { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_content_keeps_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let model = ApiChatModel::from_config(&make_config(&server.uri(), None));
        let err = model.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        match err {
            LlmError::MissingContent(raw) => assert!(raw.contains("choices")),
            other => panic!("expected MissingContent, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_json_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let model = ApiChatModel::from_config(&make_config(&server.uri(), None));
        let err = model.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[tokio::test]
    async fn connection_refused_is_a_request_error() {
        // Port 9 (discard) is not listening on test hosts.
        let model = ApiChatModel::from_config(&make_config("http://127.0.0.1:9", None));
        let err = model.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, LlmError::Request(_) | LlmError::Timeout));
    }
}
