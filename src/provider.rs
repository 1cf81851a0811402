//! External AI provider boundary
//!
//! The relay only needs two capabilities from the provider: a chat completion that
//! yields the first candidate's text, and an image generation that yields the first
//! image URL. [`OpenAiProvider`] implements both against the OpenAI REST API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chat::ChatRole;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider rejected the call, or could not be reached (no status).
    #[error("{message}")]
    Api { status: Option<u16>, message: String },
    #[error("provider returned no {0}")]
    EmptyResponse(&'static str),
    #[error("failed to decode provider response: {0}")]
    Decode(String),
}

/// The part of a chat message the provider sees. Other fields on incoming messages
/// are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProviderMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ProviderMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub n: u32,
    pub size: String,
    pub quality: String,
    pub style: String,
}

#[async_trait]
pub trait Provider: Send + Sync {
    /// Returns the text of the first completion candidate.
    async fn chat_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<String, ProviderError>;

    /// Returns the URL of the first generated image.
    async fn generate_image(
        &self,
        request: ImageRequest,
    ) -> Result<String, ProviderError>;
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// OpenAI REST client. Constructed once at startup and shared by handle.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiProvider {
    #[must_use]
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post<B: Serialize + Sync, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ProviderError::Api {
                status: None,
                message: "The OPENAI_API_KEY environment variable is missing or empty".to_string(),
            });
        };

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Api {
                status: None,
                message: format!("Connection error: {e}"),
            })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| ProviderError::Api {
            status: Some(status.as_u16()),
            message: format!("Failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorEnvelope>(&bytes).map_or_else(
                |_| status.canonical_reason().unwrap_or("Unknown error").to_string(),
                |envelope| envelope.error.message,
            );
            return Err(ProviderError::Api {
                status: Some(status.as_u16()),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn chat_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<String, ProviderError> {
        let response: CompletionResponse = self.post("/chat/completions", &request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse("choices"))?;

        Ok(choice.message.content.unwrap_or_default())
    }

    async fn generate_image(
        &self,
        request: ImageRequest,
    ) -> Result<String, ProviderError> {
        let response: ImageResponse = self.post("/images/generations", &request).await?;

        response
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .ok_or(ProviderError::EmptyResponse("image url"))
    }
}
