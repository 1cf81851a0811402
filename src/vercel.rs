//! Vercel serverless function adapter module
//!
//! Turns relay outcomes into the status and JSON body the serverless handler returns,
//! so the function in `api/chat.rs` stays a thin shell around [`crate::relay::Relay`].

use serde::Serialize;

use crate::chat::ChatResponse;
use crate::error::{ApiError, ErrorResponse};
use crate::relay::Relay;

pub const METHOD_NOT_ALLOWED: &str = "Method not allowed. Use POST.";

/// Status code and serialized JSON body for a serverless response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonReply {
    pub status_code: u16,
    pub body: String,
}

impl JsonReply {
    pub fn json(
        status_code: u16,
        body: &impl Serialize,
    ) -> Self {
        Self {
            status_code,
            body: serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string()),
        }
    }

    #[must_use]
    pub fn error(
        status_code: u16,
        message: &str,
    ) -> Self {
        Self::json(
            status_code,
            &ErrorResponse {
                error: message.to_string(),
            },
        )
    }

    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self::error(405, METHOD_NOT_ALLOWED)
    }

    /// Relay a POST body through the handler's relay.
    pub async fn relay(
        relay: &Relay,
        body: &[u8],
    ) -> Self {
        Self::from_result(&relay.handle(body).await)
    }

    #[must_use]
    pub fn from_result(result: &Result<ChatResponse, ApiError>) -> Self {
        match result {
            Ok(response) => Self::json(200, response),
            Err(e) => Self::json(e.status(), &e.to_response()),
        }
    }
}
