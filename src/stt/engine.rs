//! Speech-to-text provider interface and the hosted Whisper client.
//!
//! [`SttEngine`] works on a staged audio file rather than samples, so the
//! adapter decides where the bytes live and when they are deleted.
//! [`ApiSttEngine`] posts that file to an OpenAI-compatible
//! `/v1/audio/transcriptions` endpoint (Groq by default).

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::SttConfig;

// ---------------------------------------------------------------------------
// SttError
// ---------------------------------------------------------------------------

/// Errors from a speech-to-text provider call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SttError {
    #[error("could not read staged audio: {0}")]
    Staging(String),

    #[error("transcription request failed: {0}")]
    Request(String),

    #[error("transcription request timed out")]
    Timeout,

    #[error("transcription provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider answered 2xx with an error payload.
    #[error("transcription provider error: {0}")]
    Provider(String),

    #[error("transcription provider returned no text")]
    EmptyTranscript,
}

impl From<reqwest::Error> for SttError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SttError::Timeout
        } else {
            SttError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SttEngine trait
// ---------------------------------------------------------------------------

/// A speech-to-text backend that transcribes an audio file on disk.
#[async_trait]
pub trait SttEngine: Send + Sync {
    async fn transcribe_file(&self, path: &Path) -> Result<String, SttError>;
}

// ---------------------------------------------------------------------------
// ApiSttEngine
// ---------------------------------------------------------------------------

/// Hosted Whisper over the OpenAI transcription API.
pub struct ApiSttEngine {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    language: String,
}

impl ApiSttEngine {
    pub fn from_config(config: &SttConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            endpoint: format!(
                "{}/v1/audio/transcriptions",
                config.base_url.trim_end_matches('/')
            ),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            model: config.model.clone(),
            language: config.language.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SttEngine for ApiSttEngine {
    async fn transcribe_file(&self, path: &Path) -> Result<String, SttError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SttError::Staging(format!("{}: {e}", path.display())))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "recording.wav".into());

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/wav")?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("language", self.language.clone())
            .text("response_format", "text");

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        log::debug!("POST {} (model {})", self.endpoint, self.model);

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SttError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_transcript(&body)
    }
}

/// Pull the transcript out of a 2xx body.
///
/// `response_format=text` yields plain text, but some providers ignore it and
/// answer `{"text": ...}`; an `{"error": ...}` object is a provider failure.
pub(crate) fn parse_transcript(body: &str) -> Result<String, SttError> {
    let trimmed = body.trim();

    if trimmed.starts_with('{') {
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
            if let Some(err) = json.get("error") {
                let message = err
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| err.to_string());
                return Err(SttError::Provider(message));
            }
            if let Some(text) = json.get("text").and_then(|t| t.as_str()) {
                return non_empty(text);
            }
        }
    }

    non_empty(trimmed)
}

fn non_empty(text: &str) -> Result<String, SttError> {
    let text = text.trim();
    if text.is_empty() {
        Err(SttError::EmptyTranscript)
    } else {
        Ok(text.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
