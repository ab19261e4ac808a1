//! The tutor persona: the fixed system instruction sent with every
//! inference call.
//!
//! [`Persona`] is built once at gateway startup (from the built-in text or a
//! file named in config) and shared behind an `Arc`; it is never mutated
//! afterwards.  [`Persona::build_chat`] turns a user text into the two-message
//! chat request `[system, user]`.  Prior turns are never included: every call
//! is single-turn.

use std::path::Path;

use anyhow::{Context, Result};

use crate::llm::chat::ChatMessage;

// ---------------------------------------------------------------------------
// Built-in persona
// ---------------------------------------------------------------------------

/// Default tutoring persona.
pub const TUTOR_PERSONA: &str = "\
# English Buddy

You are a friendly English tutor who talks like a supportive friend and \
teaches like a patient teacher. The student is a non-native speaker with \
basic English who wants to improve through everyday conversation.

## Personality
- Warm, encouraging and curious about the student's life.
- Simple, clear English a beginner can follow.
- Never make the student feel bad about mistakes; celebrate progress.

If the student writes in another language, reply in English, answer what \
they said casually, and suggest how to say it in English.

## Teaching
- Ignore typos, spelling and punctuation.
- Correct grammar only (tenses, word order, agreement, articles, \
prepositions). Reply to the message first, then add a gentle tip such as \
\"By the way, instead of '...', you can say '...'\" with at most one short \
reason.
- When the meaning is clear but a native speaker would phrase it \
differently, offer the more natural expression or a useful idiom.
- At most one or two corrections per message.

## Keeping the conversation going
- When replies get short, ask about their day, food, hobbies, plans, \
family, or favourite films.
- Now and then introduce one new everyday word and ask them to use it.

## Reply shape
1. Respond to what they said.
2. One gentle correction, if needed.
3. A follow-up question.

Roughly 70% chatting, 30% teaching. Explain any harder word in \
parentheses. Help the student feel confident speaking English.";

// ---------------------------------------------------------------------------
// Persona
// ---------------------------------------------------------------------------

/// Immutable system instruction applied to every inference call.
///
/// # Example
/// ```rust
/// use english_buddy::llm::{ChatRole, Persona};
///
/// let persona = Persona::builtin();
/// let messages = persona.build_chat("Yesterday I go to market");
/// assert_eq!(messages.len(), 2);
/// assert_eq!(messages[0].role, ChatRole::System);
/// assert_eq!(messages[1].content, "Yesterday I go to market");
/// ```
#[derive(Debug, Clone)]
pub struct Persona {
    instruction: String,
}

impl Persona {
    /// The built-in tutor persona.
    pub fn builtin() -> Self {
        Self::new(TUTOR_PERSONA)
    }

    /// Wrap an arbitrary instruction string.
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
        }
    }

    /// Read the instruction from a text file.
    ///
    /// An empty (whitespace-only) file is rejected.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading persona file {}", path.display()))?;
        if text.trim().is_empty() {
            anyhow::bail!("persona file {} is empty", path.display());
        }
        Ok(Self::new(text))
    }

    /// Load from `path` when given, otherwise use the built-in persona.
    pub fn from_optional_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::builtin()),
        }
    }

    /// The raw instruction text.
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Build the `[system, user]` message pair for one call.
    ///
    /// `text` is passed through unmodified as the final message.
    pub fn build_chat(&self, text: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.instruction.clone()),
            ChatMessage::user(text),
        ]
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::chat::ChatRole;

    #[test]
    fn builtin_persona_describes_the_tutor() {
        let persona = Persona::builtin();
        assert!(persona.instruction().contains("English tutor"));
        assert!(persona.instruction().contains("grammar"));
    }

    #[test]
    fn build_chat_puts_persona_first_and_text_last() {
        let persona = Persona::new("be nice");
        let messages = persona.build_chat("  I has a cat  ");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[0].content, "be nice");
        assert_eq!(messages[1].role, ChatRole::User);
        // Forwarded byte-for-byte, including whitespace.
        assert_eq!(messages[1].content, "  I has a cat  ");
    }

    #[test]
    fn load_reads_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persona.md");
        std::fs::write(&path, "You are a pirate tutor.").unwrap();

        let persona = Persona::load(&path).unwrap();
        assert_eq!(persona.instruction(), "You are a pirate tutor.");
    }

    #[test]
    fn load_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.md");
        std::fs::write(&path, "   \n").unwrap();

        assert!(Persona::load(&path).is_err());
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let err = Persona::load(Path::new("/nonexistent/persona.md")).unwrap_err();
        assert!(err.to_string().contains("persona"));
    }

    #[test]
    fn from_optional_file_defaults_to_builtin() {
        let persona = Persona::from_optional_file(None).unwrap();
        assert_eq!(persona.instruction(), TUTOR_PERSONA);
    }
}
