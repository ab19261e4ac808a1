//! Conversation data: turns, the session they belong to, and its status.
//!
//! [`Session`] is read-only from outside the crate; every mutation goes
//! through [`SessionController`](super::SessionController) so the status
//! guard cannot be bypassed.

use chrono::{DateTime, Local};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Who wrote a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Name shown above a message bubble.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "English Buddy",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Role::User => "🧑",
            Role::Assistant => "🤖",
        }
    }
}

// ---------------------------------------------------------------------------
// Turn
// ---------------------------------------------------------------------------

/// One message in the conversation.  Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    role: Role,
    content: String,
    timestamp: DateTime<Local>,
}

impl Turn {
    pub(crate) fn new(role: Role, content: impl Into<String>) -> Self {
        Self::at(role, content, Local::now())
    }

    pub(crate) fn at(role: Role, content: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Wall-clock time of creation as `HH:MM`.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// What the session is waiting on, if anything.
///
/// ```text
/// Idle ──audio──▶ Transcribing ──Ok/Err──▶ Idle
/// Idle ──text───▶ AwaitingReply ──Ok/Err──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Transcribing,
    AwaitingReply,
}

impl SessionStatus {
    /// `true` while a transcription or exchange is outstanding.
    ///
    /// ```
    /// use english_buddy::session::SessionStatus;
    ///
    /// assert!(!SessionStatus::Idle.is_busy());
    /// assert!(SessionStatus::Transcribing.is_busy());
    /// assert!(SessionStatus::AwaitingReply.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        !matches!(self, SessionStatus::Idle)
    }

    /// Short label for the status line.
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "Ready",
            SessionStatus::Transcribing => "Transcribing...",
            SessionStatus::AwaitingReply => "Thinking...",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionStatus::Idle => "IDLE",
            SessionStatus::Transcribing => "TRANSCRIBING",
            SessionStatus::AwaitingReply => "AWAITING_REPLY",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// In-memory state of one conversation.
#[derive(Debug, Clone, Default)]
pub struct Session {
    turns: Vec<Turn>,
    pending_input: String,
    status: SessionStatus,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub(crate) fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub(crate) fn set_status(&mut self, status: SessionStatus) {
        if self.status != status {
            log::debug!("session: {} -> {}", self.status, status);
        }
        self.status = status;
    }

    pub(crate) fn pending_input_mut(&mut self) -> &mut String {
        &mut self.pending_input
    }

    pub(crate) fn reset(&mut self) {
        self.turns.clear();
        self.pending_input.clear();
        self.set_status(SessionStatus::Idle);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_session_is_idle_and_empty() {
        let session = Session::new();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.is_empty());
        assert_eq!(session.pending_input(), "");
    }

    #[test]
    fn display_names() {
        assert_eq!(Role::User.display_name(), "You");
        assert_eq!(Role::Assistant.display_name(), "English Buddy");
    }

    #[test]
    fn time_label_is_hours_and_minutes() {
        let ts = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 42).unwrap();
        let turn = Turn::at(Role::User, "Hi", ts);
        assert_eq!(turn.time_label(), "07:05");
    }

    #[test]
    fn labels() {
        assert_eq!(SessionStatus::Idle.label(), "Ready");
        assert_eq!(SessionStatus::AwaitingReply.label(), "Thinking...");
        assert_eq!(SessionStatus::AwaitingReply.to_string(), "AWAITING_REPLY");
    }

    #[test]
    fn reset_empties_everything() {
        let mut session = Session::new();
        session.push(Turn::new(Role::User, "Hello"));
        session.pending_input_mut().push_str("draft");
        session.set_status(SessionStatus::AwaitingReply);

        session.reset();

        assert!(session.is_empty());
        assert_eq!(session.pending_input(), "");
        assert_eq!(session.status(), SessionStatus::Idle);
    }
}
