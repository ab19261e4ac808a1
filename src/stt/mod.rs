//! Speech-to-text: recorded WAV bytes in, English text out.
//!
//! ```text
//! Vec<u8> ─▶ TranscriptionAdapter ─(duration check, temp .wav)─▶ SttEngine
//!                                                            └ ApiSttEngine (Groq Whisper)
//! ```
//!
//! The session depends on [`Transcriber`] only, so tests swap in stubs.

pub mod adapter;
pub mod engine;

pub use adapter::{Transcriber, TranscriptionAdapter, TranscriptionError};
pub use engine::{ApiSttEngine, SttEngine, SttError};
