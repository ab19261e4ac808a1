//! The `Gateway` trait and the in-process `InferenceGateway`.
//!
//! [`InferenceGateway`] is what the gateway server runs: persona + chat model
//! behind one `invoke(text)` call.  [`GatewayClient`](super::GatewayClient)
//! implements the same trait over HTTP so the chat session never needs to
//! know which side of the wire it is on.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::llm::{ChatModel, Persona};

// ---------------------------------------------------------------------------
// GatewayError
// ---------------------------------------------------------------------------

/// Why an `invoke` produced no reply.
///
/// Every variant is a provider-side failure from the session's point of
/// view; it is rendered into the transcript via [`GatewayError::user_message`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// The network call failed, timed out, or the model answered with
    /// something unusable.
    #[error("gateway unreachable: {0}")]
    Unreachable(String),

    /// The gateway answered with a non-success status.  `detail` is the
    /// body's `detail` field when present; `raw` is always the full body.
    #[error("gateway returned HTTP {status}: {detail}")]
    Upstream {
        status: u16,
        detail: String,
        raw: String,
    },

    /// The gateway answered 2xx but the body has no `output` field.
    #[error("gateway response has no output field: {raw}")]
    MalformedResponse { raw: String },
}

impl GatewayError {
    /// Text for the assistant bubble that stands in for the missing reply.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Unreachable(detail) => {
                format!("Error: Unable to connect to the server. {detail}")
            }
            GatewayError::Upstream {
                status,
                detail,
                raw,
            } => {
                if detail == raw {
                    format!("Error: The tutor service failed (HTTP {status}). {detail}")
                } else {
                    format!(
                        "Error: The tutor service failed (HTTP {status}). {detail} \
                         (response: {raw})"
                    )
                }
            }
            GatewayError::MalformedResponse { raw } => {
                format!("Error: Unexpected response from the server: {raw}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Gateway trait
// ---------------------------------------------------------------------------

/// Single-turn text → reply exchange.
///
/// Implementations hold no per-call mutable state; concurrent calls are
/// independent.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn invoke(&self, text: &str) -> Result<String, GatewayError>;
}

// ---------------------------------------------------------------------------
// InferenceGateway
// ---------------------------------------------------------------------------

/// Persona + chat model with a fixed timeout budget.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use english_buddy::config::AppConfig;
/// use english_buddy::gateway::{Gateway, InferenceGateway};
/// use english_buddy::llm::{ApiChatModel, Persona};
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let gateway = InferenceGateway::new(
///     Arc::new(Persona::builtin()),
///     Arc::new(ApiChatModel::from_config(&config.llm)),
///     Duration::from_secs(30),
/// );
/// let reply = gateway.invoke("Hello").await;
/// # }
/// ```
pub struct InferenceGateway {
    persona: Arc<Persona>,
    model: Arc<dyn ChatModel>,
    timeout: Duration,
}

impl InferenceGateway {
    pub fn new(persona: Arc<Persona>, model: Arc<dyn ChatModel>, timeout: Duration) -> Self {
        Self {
            persona,
            model,
            timeout,
        }
    }
}

#[async_trait]
impl Gateway for InferenceGateway {
    /// Never fails with anything but [`GatewayError::Unreachable`].
    async fn invoke(&self, text: &str) -> Result<String, GatewayError> {
        log::debug!("gateway: invoke (len={})", text.len());

        let messages = self.persona.build_chat(text);

        match tokio::time::timeout(self.timeout, self.model.complete(&messages)).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(e)) => {
                log::warn!("gateway: model call failed: {e}");
                Err(GatewayError::Unreachable(e.to_string()))
            }
            Err(_) => {
                log::warn!(
                    "gateway: model call exceeded {}s budget",
                    self.timeout.as_secs()
                );
                Err(GatewayError::Unreachable(format!(
                    "no reply within {} seconds",
                    self.timeout.as_secs()
                )))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
