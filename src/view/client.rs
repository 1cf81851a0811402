//! Transport from the chat view to the relay endpoint

use async_trait::async_trait;
use serde_json::Value;

use crate::chat::{ChatPayload, ChatResponse};

/// What the relay answered. Both variants carry a JSON body the view can display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayReply {
    Message(ChatResponse),
    Error { status: u16, error: String },
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request to relay failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("relay returned a non-JSON or unexpected response (status {status})")]
    InvalidResponse { status: u16 },
}

#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn send(
        &self,
        payload: &ChatPayload,
    ) -> Result<RelayReply, TransportError>;
}

/// Posts payloads to `{base_url}/api/chat`.
pub struct HttpRelayClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRelayClient {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RelayTransport for HttpRelayClient {
    async fn send(
        &self,
        payload: &ChatPayload,
    ) -> Result<RelayReply, TransportError> {
        let response = self.client.post(&self.endpoint).json(payload).send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        let body: Value = serde_json::from_slice(&bytes).map_err(|_| TransportError::InvalidResponse { status })?;

        if (200..300).contains(&status) {
            return serde_json::from_value(body)
                .map(RelayReply::Message)
                .map_err(|_| TransportError::InvalidResponse { status });
        }

        let error = body
            .get("error")
            .and_then(Value::as_str)
            .map_or_else(|| format!("Request failed with status {status}"), str::to_string);

        Ok(RelayReply::Error { status, error })
    }
}
