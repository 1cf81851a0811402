//! Chat view
//!
//! The conversation state machine ([`state::ChatView`]), its transport to the relay,
//! and a terminal front end that renders it.

pub mod client;
pub mod markdown;
pub mod models;
pub mod render;
pub mod state;
pub mod terminal;
pub mod wrap;

pub use client::{HttpRelayClient, RelayReply, RelayTransport, TransportError};
pub use models::{AVAILABLE_MODELS, ModelInfo};
pub use state::{ChatView, FALLBACK_REPLY, KeyInput, KeyOutcome};
