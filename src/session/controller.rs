//! Sequences user input through transcription and the gateway.
//!
//! Every action is split in two:
//!
//! * a synchronous **begin** step that checks the status guard, records what
//!   can be recorded immediately (the USER turn, the last audio buffer) and
//!   hands back a ticket;
//! * a synchronous **complete** step that takes the ticket's outcome and
//!   settles the session back to [`SessionStatus::Idle`].
//!
//! Tickets own everything they need and are `Send + 'static`, so a UI can
//! run them on a tokio runtime while it keeps drawing.  [`submit`] and
//! [`transcribe`] chain both steps for callers that can simply await.
//!
//! [`submit`]: SessionController::submit
//! [`transcribe`]: SessionController::transcribe

use std::sync::Arc;

use thiserror::Error;

use crate::gateway::{Gateway, GatewayError};
use crate::stt::{Transcriber, TranscriptionError};

use super::state::{Role, Session, SessionStatus, Turn};

/// Shown in place of a reply that came back blank.
const EMPTY_REPLY: &str = "Error: The tutor sent an empty reply. Please try again.";

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// The action is not allowed in the current status.
    #[error("Cannot {action} while {status}")]
    InvalidState {
        action: &'static str,
        status: SessionStatus,
    },

    #[error("Please type or record a message first.")]
    EmptyInput,

    #[error(transparent)]
    Transcription(#[from] TranscriptionError),
}

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

/// One outstanding gateway call.
pub struct ExchangeTicket {
    gateway: Arc<dyn Gateway>,
    text: String,
}

impl ExchangeTicket {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub async fn run(self) -> Result<String, GatewayError> {
        self.gateway.invoke(&self.text).await
    }
}

/// One outstanding transcription.
pub struct TranscriptionTicket {
    transcriber: Arc<dyn Transcriber>,
    audio: Vec<u8>,
    min_duration_secs: f64,
}

impl TranscriptionTicket {
    pub async fn run(self) -> Result<String, TranscriptionError> {
        self.transcriber
            .transcribe(&self.audio, self.min_duration_secs)
            .await
    }
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

/// Owns the [`Session`] and is the only thing allowed to change it.
pub struct SessionController {
    session: Session,
    gateway: Arc<dyn Gateway>,
    transcriber: Arc<dyn Transcriber>,
    min_duration_secs: f64,
    last_audio: Option<Vec<u8>>,
}

impl SessionController {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        transcriber: Arc<dyn Transcriber>,
        min_duration_secs: f64,
    ) -> Self {
        Self {
            session: Session::new(),
            gateway,
            transcriber,
            min_duration_secs,
            last_audio: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn turns(&self) -> &[Turn] {
        self.session.turns()
    }

    pub fn pending_input(&self) -> &str {
        self.session.pending_input()
    }

    /// The scratch buffer behind the input box.
    pub fn pending_input_mut(&mut self) -> &mut String {
        self.session.pending_input_mut()
    }

    fn guard_idle(&self, action: &'static str) -> Result<(), SessionError> {
        let status = self.session.status();
        if status.is_busy() {
            log::debug!("session: rejected {action} while {status}");
            return Err(SessionError::InvalidState { action, status });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Text exchange
    // -----------------------------------------------------------------------

    /// Append the USER turn for `text` and move to `AwaitingReply`.
    ///
    /// `text` is stored and forwarded exactly as given; it only has to be
    /// non-blank.
    pub fn begin_submit(&mut self, text: &str) -> Result<ExchangeTicket, SessionError> {
        self.guard_idle("send a message")?;
        if text.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }

        self.session.push(Turn::new(Role::User, text));
        self.session.set_status(SessionStatus::AwaitingReply);

        Ok(ExchangeTicket {
            gateway: Arc::clone(&self.gateway),
            text: text.to_string(),
        })
    }

    /// [`begin_submit`](Self::begin_submit) with the pending input.
    pub fn begin_submit_pending(&mut self) -> Result<ExchangeTicket, SessionError> {
        let text = self.session.pending_input().to_string();
        self.begin_submit(&text)
    }

    /// Append the ASSISTANT turn for `outcome` and return to `Idle`.
    ///
    /// A failed call still produces an assistant turn, carrying the error
    /// text, so every USER turn stays paired.
    pub fn complete_exchange(
        &mut self,
        outcome: Result<String, GatewayError>,
    ) -> Result<&Turn, SessionError> {
        let status = self.session.status();
        if status != SessionStatus::AwaitingReply {
            return Err(SessionError::InvalidState {
                action: "complete an exchange",
                status,
            });
        }

        let content = match outcome {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => {
                log::warn!("gateway returned a blank reply");
                EMPTY_REPLY.to_string()
            }
            Err(e) => {
                log::warn!("exchange failed: {e}");
                e.user_message()
            }
        };

        self.session.push(Turn::new(Role::Assistant, content));
        self.session.pending_input_mut().clear();
        self.session.set_status(SessionStatus::Idle);

        self.session
            .turns()
            .last()
            .ok_or(SessionError::InvalidState {
                action: "complete an exchange",
                status: SessionStatus::Idle,
            })
    }

    /// Run a whole exchange for `text`.
    pub async fn submit(&mut self, text: &str) -> Result<&Turn, SessionError> {
        let ticket = self.begin_submit(text)?;
        let outcome = ticket.run().await;
        self.complete_exchange(outcome)
    }

    // -----------------------------------------------------------------------
    // Transcription
    // -----------------------------------------------------------------------

    /// Move to `Transcribing` for `audio`.
    ///
    /// Returns `Ok(None)` when `audio` is byte-for-byte the buffer processed
    /// last time; nothing changes in that case.
    pub fn begin_transcription(
        &mut self,
        audio: Vec<u8>,
    ) -> Result<Option<TranscriptionTicket>, SessionError> {
        self.guard_idle("transcribe audio")?;

        if self.last_audio.as_deref() == Some(audio.as_slice()) {
            log::debug!("session: ignoring repeated recording ({} bytes)", audio.len());
            return Ok(None);
        }
        self.last_audio = Some(audio.clone());
        self.session.set_status(SessionStatus::Transcribing);

        Ok(Some(TranscriptionTicket {
            transcriber: Arc::clone(&self.transcriber),
            audio,
            min_duration_secs: self.min_duration_secs,
        }))
    }

    /// Settle a transcription.  On success the text becomes the pending
    /// input; on failure the pending input is left alone.
    pub fn complete_transcription(
        &mut self,
        outcome: Result<String, TranscriptionError>,
    ) -> Result<&str, SessionError> {
        let status = self.session.status();
        if status != SessionStatus::Transcribing {
            return Err(SessionError::InvalidState {
                action: "complete a transcription",
                status,
            });
        }
        self.session.set_status(SessionStatus::Idle);

        let text = outcome?;
        *self.session.pending_input_mut() = text;
        Ok(self.session.pending_input())
    }

    /// Run a whole transcription.  `Ok(None)` means the buffer was a repeat.
    pub async fn transcribe(&mut self, audio: Vec<u8>) -> Result<Option<String>, SessionError> {
        let Some(ticket) = self.begin_transcription(audio)? else {
            return Ok(None);
        };
        let outcome = ticket.run().await;
        self.complete_transcription(outcome)
            .map(|text| Some(text.to_string()))
    }

    // -----------------------------------------------------------------------
    // Clear
    // -----------------------------------------------------------------------

    /// Forget all turns and the pending input.  Rejected while busy.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.guard_idle("clear the chat")?;
        self.session.reset();
        log::info!("session cleared");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
