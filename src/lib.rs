//! English Buddy: a conversational English tutor.
//!
//! Two processes share this crate:
//!
//! * `english-buddy`, the egui chat window ([`app`]), which records speech
//!   ([`audio`]), transcribes it ([`stt`]) and drives a conversation
//!   ([`session`]) against the gateway over HTTP;
//! * `english-buddy-gateway`, which serves `POST /chain/invoke`
//!   ([`gateway`]) and calls the hosted chat model with the tutor persona
//!   ([`llm`]).

pub mod app;
pub mod audio;
pub mod config;
pub mod gateway;
pub mod llm;
pub mod session;
pub mod stt;
