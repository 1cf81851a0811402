use serde::{Deserialize, Serialize};

#[cfg(feature = "server")]
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub enum ChatRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

/// How a message's `content` is meant to be displayed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "server", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    /// `content` is the URL of a generated image.
    Image,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(rename = "type", default)]
    pub kind: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            kind: MessageType::Text,
            model: None,
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            kind: MessageType::Text,
            model: None,
        }
    }

    #[must_use]
    pub fn with_kind(
        mut self,
        kind: MessageType,
    ) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_model(
        mut self,
        model: impl Into<String>,
    ) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        self.kind == MessageType::Image
    }
}

/// Operation requested by the client for a single relay call.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, strum::EnumString, strum::Display,
)]
#[cfg_attr(feature = "server", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatMode {
    /// Text completion over the whole conversation.
    #[default]
    Chat,
    /// Image generation from the last message.
    Image,
}

/// Request body sent by the chat view to `POST /api/chat`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct ChatPayload {
    pub messages: Vec<ChatMessage>,
    pub mode: ChatMode,
    pub model: String,
}

/// Successful relay reply.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct ChatResponse {
    pub content: String,
    pub role: ChatRole,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageType>,
}

impl ChatResponse {
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: ChatRole::Assistant,
            kind: None,
        }
    }

    #[must_use]
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            content: url.into(),
            role: ChatRole::Assistant,
            kind: Some(MessageType::Image),
        }
    }
}
