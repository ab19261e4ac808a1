//! HTTP client side of `POST /chain/invoke`.
//!
//! Used by the chat process; it never sees the persona or provider
//! credentials.  Any response without an `output` field is an error, and the
//! raw body is kept so the user can see what came back.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::GatewayConfig;

use super::service::{Gateway, GatewayError};
use super::wire::InvokeRequest;

/// Talks to a gateway process over HTTP.
pub struct GatewayClient {
    client: reqwest::Client,
    invoke_url: String,
    timeout: Duration,
}

impl GatewayClient {
    /// Build a client for `config.url` with a `config.timeout_secs` budget
    /// per call.
    pub fn from_config(config: &GatewayConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            invoke_url: format!("{}/chain/invoke", config.url.trim_end_matches('/')),
            timeout,
        }
    }

    pub fn invoke_url(&self) -> &str {
        &self.invoke_url
    }
}

#[async_trait]
impl Gateway for GatewayClient {
    async fn invoke(&self, text: &str) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(&self.invoke_url)
            .json(&InvokeRequest::new(text))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let raw = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        parse_invoke_response(status, &raw)
    }
}

impl GatewayClient {
    fn transport_error(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Unreachable(format!(
                "no reply within {} seconds",
                self.timeout.as_secs()
            ))
        } else {
            GatewayError::Unreachable(e.to_string())
        }
    }
}

/// Interpret a gateway answer.
///
/// * non-2xx → [`GatewayError::Upstream`], using `detail` when the body has
///   one and the raw body otherwise, and always keeping the raw body;
/// * 2xx with a string `output` → that string;
/// * 2xx with a non-string `output` → its JSON text;
/// * anything else → [`GatewayError::MalformedResponse`] carrying `raw`.
pub(crate) fn parse_invoke_response(status: u16, raw: &str) -> Result<String, GatewayError> {
    let json: Option<serde_json::Value> = serde_json::from_str(raw).ok();

    if !(200..300).contains(&status) {
        let detail = json
            .as_ref()
            .and_then(|j| j.get("detail"))
            .and_then(|d| d.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| raw.to_string());
        return Err(GatewayError::Upstream {
            status,
            detail,
            raw: raw.to_string(),
        });
    }

    match json.as_ref().and_then(|j| j.get("output")) {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
        None => Err(GatewayError::MalformedResponse {
            raw: raw.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
