//! Relay between the chat view and the provider
//!
//! This module contains the request handling shared by the standalone server and the
//! serverless function: validate the body, dispatch on mode, reshape the result.

use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;

use crate::chat::{ChatMode, ChatResponse};
use crate::error::ApiError;
use crate::provider::{CompletionRequest, ImageRequest, Provider, ProviderMessage};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const CHAT_TEMPERATURE: f32 = 0.7;
pub const CHAT_MAX_TOKENS: u32 = 1000;
pub const IMAGE_MODEL: &str = "dall-e-3";
pub const IMAGE_SIZE: &str = "1024x1024";
pub const IMAGE_QUALITY: &str = "hd";
pub const IMAGE_STYLE: &str = "vivid";

pub const INVALID_MESSAGES: &str = "Invalid messages format";
pub const INVALID_MODE: &str = "Invalid mode";

/// A request body that passed message validation. `mode` is checked at dispatch.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    pub messages: Vec<ProviderMessage>,
    pub mode: Option<String>,
    pub model: String,
}

/// Parse a raw `/api/chat` body.
///
/// # Errors
///
/// Returns [`ApiError::BadRequest`] with "Invalid messages format" when the body is not a
/// JSON object or `messages` is missing, not an array, empty, or holds an entry without a
/// known `role` and a string `content`. Client-side tags such as `type` and `model` are
/// not checked.
pub fn parse_request(body: &[u8]) -> Result<RelayRequest, ApiError> {
    let mut value: Value = serde_json::from_slice(body).map_err(|e| {
        tracing::warn!("Request body is not valid JSON: {}", e);
        ApiError::bad_request(INVALID_MESSAGES)
    })?;

    let messages = match value.get_mut("messages").map(Value::take) {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(ApiError::bad_request(INVALID_MESSAGES)),
    };

    let messages = messages
        .into_iter()
        .map(serde_json::from_value::<ProviderMessage>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            tracing::warn!("Malformed message in request: {}", e);
            ApiError::bad_request(INVALID_MESSAGES)
        })?;

    let mode = value.get("mode").and_then(Value::as_str).map(str::to_string);
    let model = value
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_MODEL)
        .to_string();

    Ok(RelayRequest { messages, mode, model })
}

/// Stateless relay over a shared provider handle.
#[derive(Clone)]
pub struct Relay {
    provider: Arc<dyn Provider>,
}

impl Relay {
    #[must_use]
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    /// Validate and relay a raw request body.
    ///
    /// # Errors
    ///
    /// Returns a 400-class [`ApiError`] for malformed input, the provider's status for
    /// provider rejections, and a 500-class error for anything else.
    pub async fn handle(
        &self,
        body: &[u8],
    ) -> Result<ChatResponse, ApiError> {
        let result = match parse_request(body) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => Err(e),
        };

        if let Err(ref e) = result {
            tracing::error!("API Error: {}", e);
        }
        result
    }

    /// Dispatch an already-parsed request on its mode.
    ///
    /// # Errors
    ///
    /// See [`Relay::handle`].
    pub async fn dispatch(
        &self,
        request: RelayRequest,
    ) -> Result<ChatResponse, ApiError> {
        let mode = request
            .mode
            .as_deref()
            .and_then(|mode| ChatMode::from_str(mode).ok())
            .ok_or_else(|| ApiError::bad_request(INVALID_MODE))?;

        tracing::info!("Relaying {} request with {} message(s) using model: {}", mode, request.messages.len(), request.model);

        match mode {
            ChatMode::Chat => self.chat(request).await,
            ChatMode::Image => self.image(request).await,
        }
    }

    async fn chat(
        &self,
        request: RelayRequest,
    ) -> Result<ChatResponse, ApiError> {
        let completion = CompletionRequest {
            model: request.model,
            messages: request.messages,
            temperature: CHAT_TEMPERATURE,
            max_tokens: CHAT_MAX_TOKENS,
        };

        let content = self.provider.chat_completion(completion).await?;
        Ok(ChatResponse::text(content))
    }

    async fn image(
        &self,
        request: RelayRequest,
    ) -> Result<ChatResponse, ApiError> {
        // parse_request guarantees at least one message
        let prompt = request
            .messages
            .last()
            .map(|message| message.content.clone())
            .ok_or_else(|| ApiError::bad_request(INVALID_MESSAGES))?;

        let image = ImageRequest {
            model: IMAGE_MODEL.to_string(),
            prompt,
            n: 1,
            size: IMAGE_SIZE.to_string(),
            quality: IMAGE_QUALITY.to_string(),
            style: IMAGE_STYLE.to_string(),
        };

        let url = self.provider.generate_image(image).await?;
        Ok(ChatResponse::image(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatRole, MessageType};
    use crate::provider::ProviderError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeProvider {
        completions: Mutex<Vec<CompletionRequest>>,
        images: Mutex<Vec<ImageRequest>>,
        fail_with: Option<(Option<u16>, &'static str)>,
    }

    impl FakeProvider {
        fn failing(
            status: Option<u16>,
            message: &'static str,
        ) -> Self {
            Self {
                fail_with: Some((status, message)),
                ..Self::default()
            }
        }

        fn error(&self) -> Option<ProviderError> {
            self.fail_with.map(|(status, message)| ProviderError::Api {
                status,
                message: message.to_string(),
            })
        }
    }

    #[async_trait]
    impl Provider for FakeProvider {
        async fn chat_completion(
            &self,
            request: CompletionRequest,
        ) -> Result<String, ProviderError> {
            self.completions.lock().unwrap().push(request);
            self.error().map_or_else(|| Ok("Hello".to_string()), Err)
        }

        async fn generate_image(
            &self,
            request: ImageRequest,
        ) -> Result<String, ProviderError> {
            self.images.lock().unwrap().push(request);
            self.error().map_or_else(|| Ok("https://x/img.png".to_string()), Err)
        }
    }

    fn relay_with(provider: FakeProvider) -> (Relay, Arc<FakeProvider>) {
        let provider = Arc::new(provider);
        (Relay::new(provider.clone()), provider)
    }

    async fn expect_bad_request(
        body: &str,
        expected: &str,
    ) {
        let (relay, provider) = relay_with(FakeProvider::default());
        let err = relay.handle(body.as_bytes()).await.unwrap_err();
        assert_eq!(err.status(), 400, "body: {body}");
        assert_eq!(err.to_response().error, expected, "body: {body}");
        assert!(provider.completions.lock().unwrap().is_empty());
        assert!(provider.images.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_messages_are_rejected() {
        for body in [
            r#"{"mode":"chat"}"#,
            r#"{"messages":[],"mode":"chat"}"#,
            r#"{"messages":"hi","mode":"chat"}"#,
            r#"{"messages":{"role":"user"},"mode":"chat"}"#,
            r#"{"messages":null,"mode":"image"}"#,
            r#"{"messages":[{"role":"robot","content":"hi"}],"mode":"chat"}"#,
            r#"{"messages":[{"role":"user"}],"mode":"chat"}"#,
            r#"[1,2,3]"#,
            "not json",
        ] {
            expect_bad_request(body, INVALID_MESSAGES).await;
        }
    }

    #[tokio::test]
    async fn test_invalid_mode_is_rejected() {
        for body in [
            r#"{"messages":[{"role":"user","content":"hi"}],"mode":"video"}"#,
            r#"{"messages":[{"role":"user","content":"hi"}],"mode":"CHAT"}"#,
            r#"{"messages":[{"role":"user","content":"hi"}],"mode":7}"#,
            r#"{"messages":[{"role":"user","content":"hi"}]}"#,
        ] {
            expect_bad_request(body, INVALID_MODE).await;
        }
    }

    #[tokio::test]
    async fn test_messages_are_validated_before_mode() {
        expect_bad_request(r#"{"messages":[],"mode":"video"}"#, INVALID_MESSAGES).await;
    }

    #[tokio::test]
    async fn test_chat_mode_forwards_history_with_fixed_parameters() {
        let (relay, provider) = relay_with(FakeProvider::default());
        let body = serde_json::json!({
            "messages": [
                {"role": "user", "content": "Hi", "model": "o3"},
                {"role": "assistant", "content": "Hey", "type": "text"},
                {"role": "user", "content": "How are you?"}
            ],
            "mode": "chat",
            "model": "o4-mini"
        });

        let response = relay.handle(body.to_string().as_bytes()).await.unwrap();
        assert_eq!(response, ChatResponse::text("Hello"));

        let calls = provider.completions.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "o4-mini");
        assert!((calls[0].temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(calls[0].max_tokens, 1000);
        assert_eq!(calls[0].messages.len(), 3);
        assert_eq!(calls[0].messages[1].role, ChatRole::Assistant);
        assert_eq!(calls[0].messages[2].content, "How are you?");
    }

    #[tokio::test]
    async fn test_client_tags_on_messages_are_not_validated() {
        let (relay, provider) = relay_with(FakeProvider::default());
        let body = serde_json::json!({
            "messages": [
                {"role": "user", "content": "Draw a cat", "type": "sketch", "model": 4},
                {"role": "assistant", "content": "https://x/cat.png", "type": "image", "model": null},
                {"role": "user", "content": "Describe it"}
            ],
            "mode": "chat",
            "model": "gpt-4o"
        });

        let response = relay.handle(body.to_string().as_bytes()).await.unwrap();
        assert_eq!(response, ChatResponse::text("Hello"));

        let calls = provider.completions.lock().unwrap();
        assert_eq!(
            calls[0].messages[0],
            ProviderMessage {
                role: ChatRole::User,
                content: "Draw a cat".to_string(),
            }
        );
        assert_eq!(calls[0].messages[1].content, "https://x/cat.png");
    }

    #[tokio::test]
    async fn test_chat_model_defaults_to_gpt_4o() {
        let (relay, provider) = relay_with(FakeProvider::default());
        let body = r#"{"messages":[{"role":"user","content":"Hi"}],"mode":"chat"}"#;

        relay.handle(body.as_bytes()).await.unwrap();
        assert_eq!(provider.completions.lock().unwrap()[0].model, DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn test_image_mode_uses_last_message_as_prompt() {
        let (relay, provider) = relay_with(FakeProvider::default());
        let body = serde_json::json!({
            "messages": [
                {"role": "user", "content": "tell me about foxes"},
                {"role": "assistant", "content": "Foxes are..."},
                {"role": "user", "content": "a red fox in snow"}
            ],
            "mode": "image",
            "model": "o3"
        });

        let response = relay.handle(body.to_string().as_bytes()).await.unwrap();
        assert_eq!(response.content, "https://x/img.png");
        assert_eq!(response.role, ChatRole::Assistant);
        assert_eq!(response.kind, Some(MessageType::Image));

        let calls = provider.images.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, "a red fox in snow");
        assert_eq!(calls[0].model, IMAGE_MODEL);
        assert_eq!(calls[0].n, 1);
        assert_eq!(calls[0].size, "1024x1024");
        assert_eq!(calls[0].quality, "hd");
        assert_eq!(calls[0].style, "vivid");
        assert!(provider.completions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provider_rejection_keeps_status() {
        let (relay, _) = relay_with(FakeProvider::failing(Some(429), "rate limited"));
        let body = r#"{"messages":[{"role":"user","content":"Hi"}],"mode":"chat"}"#;

        let err = relay.handle(body.as_bytes()).await.unwrap_err();
        assert_eq!(err.status(), 429);
        assert_eq!(err.to_response().error, "OpenAI API error: rate limited");
    }

    #[tokio::test]
    async fn test_provider_rejection_without_status_is_500() {
        let (relay, _) = relay_with(FakeProvider::failing(None, "Connection error."));
        let body = r#"{"messages":[{"role":"user","content":"a cat"}],"mode":"image"}"#;

        let err = relay.handle(body.as_bytes()).await.unwrap_err();
        assert_eq!(err.status(), 500);
        assert_eq!(err.to_response().error, "OpenAI API error: Connection error.");
    }
}
