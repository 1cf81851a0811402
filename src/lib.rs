//! # mss-assistant
//!
//! A chat client and relay endpoint for hosted OpenAI chat completions and image
//! generation.
//!
//! The crate has two halves:
//!
//! - **Relay**: `POST /api/chat` validates a conversation, forwards it to the provider in
//!   either `chat` mode (text completion) or `image` mode (DALL-E 3 generation from the
//!   last message), and reshapes the result into `{ content, role, type? }`. Provider
//!   failures become `{ error }` responses carrying the provider's status code.
//! - **Chat view**: an in-memory conversation with a loading flag, mode toggle and model
//!   selector, rendered in the terminal with Markdown formatting.
//!
//! ## Library Usage
//!
//! The relay logic does not depend on the HTTP server and can be driven directly:
//!
//! ```toml
//! [dependencies]
//! mss-assistant = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mss_assistant::{OpenAiProvider, Relay};
//!
//! #[tokio::main]
//! async fn main() {
//!     let provider = OpenAiProvider::new(std::env::var("OPENAI_API_KEY").ok(), "https://api.openai.com/v1");
//!     let relay = Relay::new(Arc::new(provider));
//!
//!     let body = br#"{"messages":[{"role":"user","content":"Hello!"}],"mode":"chat","model":"gpt-4o"}"#;
//!     match relay.handle(body).await {
//!         Ok(reply) => println!("{}", reply.content),
//!         Err(e) => eprintln!("{} {}", e.status(), e.to_response().error),
//!     }
//! }
//! ```
//!
//! ## Server Mode
//!
//! With the `server` feature (enabled by default) run the relay with
//! `cargo run --bin mss-assistant`, and the terminal view with
//! `cargo run --bin mss-chat`.

// Core modules - always available
pub mod chat;
pub mod error;
pub mod provider;
pub mod relay;

#[cfg(any(feature = "server", feature = "client"))]
pub mod config;

// Server-specific modules - only when server feature is enabled
#[cfg(feature = "server")]
pub mod server;
#[cfg(feature = "server")]
pub mod vercel;

// Chat view - only when client feature is enabled
#[cfg(feature = "client")]
pub mod view;

// Re-export commonly used types for easier access
pub use chat::{ChatMessage, ChatMode, ChatPayload, ChatResponse, ChatRole, MessageType};
pub use error::{ApiError, ErrorResponse};
pub use provider::{OpenAiProvider, Provider, ProviderError};
pub use relay::Relay;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_role_serialization() {
        let role = ChatRole::User;
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, r#""user""#);

        let role = ChatRole::Assistant;
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, r#""assistant""#);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert!(serde_json::from_str::<ChatRole>(r#""system""#).is_err());
    }

    #[test]
    fn test_chat_payload_serialization() {
        let payload = ChatPayload {
            messages: vec![
                ChatMessage::user("Draw a lighthouse").with_model("gpt-4o"),
                ChatMessage::assistant("https://x/img.png")
                    .with_kind(MessageType::Image)
                    .with_model("gpt-4o"),
            ],
            mode: ChatMode::Image,
            model: "gpt-4o".to_string(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["mode"], "image");
        assert_eq!(json["messages"][1]["type"], "image");

        let deserialized: ChatPayload = serde_json::from_value(json).unwrap();
        assert_eq!(deserialized.messages, payload.messages);
    }

    #[test]
    fn test_error_response_structure() {
        let error = ErrorResponse {
            error: "Invalid mode".to_string(),
        };

        assert_eq!(serde_json::to_string(&error).unwrap(), r#"{"error":"Invalid mode"}"#);
    }

    #[test]
    fn test_view_history_is_accepted_as_provider_input() {
        let message = ChatMessage::assistant("https://x/img.png")
            .with_kind(MessageType::Image)
            .with_model("o3");
        let json = serde_json::to_value(&message).unwrap();

        let forwarded: provider::ProviderMessage = serde_json::from_value(json).unwrap();
        assert_eq!(forwarded.role, ChatRole::Assistant);
        assert_eq!(forwarded.content, "https://x/img.png");
    }
}
