//! Inference gateway: one HTTP route in front of the hosted chat model.
//!
//! # Architecture
//!
//! ```text
//!  chat process                         gateway process
//! ┌──────────────────┐   POST /chain/invoke   ┌──────────────────────────┐
//! │ SessionController│ ─────────────────────▶ │ router() ─▶ InferenceGateway│
//! │  └ GatewayClient │ ◀───────────────────── │   persona + ChatModel     │
//! └──────────────────┘   { "output": "..." }  └──────────────────────────┘
//! ```
//!
//! Both [`GatewayClient`] and [`InferenceGateway`] implement [`Gateway`], so
//! the session can be tested against either (or a stub).

pub mod client;
pub mod server;
pub mod service;
pub mod wire;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::GatewayClient;
pub use server::{router, serve};
pub use service::{Gateway, GatewayError, InferenceGateway};
pub use wire::{BatchRequest, BatchResponse, ErrorBody, InvokeInput, InvokeRequest, InvokeResponse};
