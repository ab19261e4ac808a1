//! Conversation session: turn history, pending input, and the status guard
//! that keeps at most one transcription or exchange in flight.

pub mod controller;
pub mod state;

pub use controller::{ExchangeTicket, SessionController, SessionError, TranscriptionTicket};
pub use state::{Role, Session, SessionStatus, Turn};
