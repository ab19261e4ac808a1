//! Chat-model layer used by the inference gateway.
//!
//! This module provides:
//! * [`ChatModel`]: async trait implemented by chat-completion backends.
//! * [`ApiChatModel`]: OpenAI-compatible REST backend (Groq by default).
//! * [`Persona`]: the immutable tutor system instruction.
//! * [`LlmError`]: error variants for model calls.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use english_buddy::config::AppConfig;
//! use english_buddy::llm::{ApiChatModel, ChatModel, Persona};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let model = ApiChatModel::from_config(&config.llm);
//!     let persona = Persona::builtin();
//!
//!     let reply = model
//!         .complete(&persona.build_chat("Yesterday I go to market"))
//!         .await
//!         .unwrap();
//!     println!("{reply}");
//! }
//! ```

pub mod chat;
pub mod persona;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use chat::{ApiChatModel, ChatMessage, ChatModel, ChatRole, LlmError};
pub use persona::{Persona, TUTOR_PERSONA};
