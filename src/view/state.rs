//! Chat view state
//!
//! [`ChatView`] owns everything the view shows: the conversation, the input box, the
//! loading flag and the mode/model selections. It performs no I/O of its own; the
//! terminal loop (or a test) feeds it key presses and relay outcomes.

use crate::chat::{ChatMessage, ChatMode, ChatPayload};
use crate::relay::DEFAULT_MODEL;

use super::client::{RelayReply, RelayTransport, TransportError};
use super::models::{AVAILABLE_MODELS, find_model, model_index};
use super::wrap::display_width;

pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";
pub const MIN_INPUT_ROWS: usize = 2;
pub const MAX_INPUT_ROWS: usize = 8;

/// Editing input after the terminal layer has interpreted modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Backspace,
    /// Plain Enter.
    Enter,
    /// Shift+Enter, inserts a newline.
    ShiftEnter,
}

#[derive(Debug, Clone)]
pub enum KeyOutcome {
    /// A request should be sent with this payload.
    Submit(ChatPayload),
    Edited,
    Ignored,
}

#[derive(Debug, Clone)]
pub struct ChatView {
    messages: Vec<ChatMessage>,
    input: String,
    loading: bool,
    mode: ChatMode,
    selected_model: String,
    show_model_dropdown: bool,
    dropdown_cursor: usize,
    /// Model selected when the in-flight request was sent.
    pending_model: Option<String>,
}

impl Default for ChatView {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            loading: false,
            mode: ChatMode::Chat,
            selected_model: DEFAULT_MODEL.to_string(),
            show_model_dropdown: false,
            dropdown_cursor: 0,
            pending_model: None,
        }
    }
}

impl ChatView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(
        &mut self,
        input: impl Into<String>,
    ) {
        self.input = input.into();
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    #[must_use]
    pub fn selected_model(&self) -> &str {
        &self.selected_model
    }

    #[must_use]
    pub fn show_model_dropdown(&self) -> bool {
        self.show_model_dropdown
    }

    #[must_use]
    pub fn dropdown_cursor(&self) -> usize {
        self.dropdown_cursor
    }

    /// Start a submission.
    ///
    /// Returns `None` without touching state when the input is blank or a request is
    /// already in flight. Otherwise the user message is appended, the input cleared,
    /// the loading flag set, and the payload for the relay returned.
    pub fn begin_submit(&mut self) -> Option<ChatPayload> {
        if self.input.trim().is_empty() || self.loading {
            return None;
        }

        let content = std::mem::take(&mut self.input);
        self.messages
            .push(ChatMessage::user(content).with_model(self.selected_model.clone()));
        self.loading = true;
        self.pending_model = Some(self.selected_model.clone());

        Some(ChatPayload {
            messages: self.messages.clone(),
            mode: self.mode,
            model: self.selected_model.clone(),
        })
    }

    /// Record the outcome of the request started by [`ChatView::begin_submit`]. The reply
    /// is tagged with the model that was selected when the request was sent.
    pub fn finish_submit(
        &mut self,
        outcome: Result<RelayReply, TransportError>,
    ) {
        let reply = match outcome {
            Ok(RelayReply::Message(response)) => ChatMessage {
                role: response.role,
                content: response.content,
                kind: response.kind.unwrap_or_default(),
                model: None,
            },
            Ok(RelayReply::Error { status, error }) => {
                tracing::warn!("Relay answered with status {}: {}", status, error);
                ChatMessage::assistant(error)
            }
            Err(e) => {
                tracing::error!("Error: {}", e);
                ChatMessage::assistant(FALLBACK_REPLY)
            }
        };

        let model = self
            .pending_model
            .take()
            .unwrap_or_else(|| self.selected_model.clone());
        self.messages.push(reply.with_model(model));
        self.loading = false;
    }

    /// Submit the current input through `transport` and wait for the reply.
    ///
    /// Returns whether a request was issued.
    pub async fn submit<T: RelayTransport + ?Sized>(
        &mut self,
        transport: &T,
    ) -> bool {
        let Some(payload) = self.begin_submit() else {
            return false;
        };

        let outcome = transport.send(&payload).await;
        self.finish_submit(outcome);
        true
    }

    /// Apply an editing key. The input is read-only while a request is in flight.
    pub fn handle_key(
        &mut self,
        key: KeyInput,
    ) -> KeyOutcome {
        match key {
            KeyInput::Enter => self.begin_submit().map_or(KeyOutcome::Ignored, KeyOutcome::Submit),
            _ if self.loading => KeyOutcome::Ignored,
            KeyInput::ShiftEnter => {
                self.input.push('\n');
                KeyOutcome::Edited
            }
            KeyInput::Char(c) => {
                self.input.push(c);
                KeyOutcome::Edited
            }
            KeyInput::Backspace => {
                if self.input.pop().is_some() {
                    KeyOutcome::Edited
                } else {
                    KeyOutcome::Ignored
                }
            }
        }
    }

    /// Empty the conversation. No confirmation, no undo.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn set_mode(
        &mut self,
        mode: ChatMode,
    ) {
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            ChatMode::Chat => ChatMode::Image,
            ChatMode::Image => ChatMode::Chat,
        };
    }

    pub fn toggle_model_dropdown(&mut self) {
        self.show_model_dropdown = !self.show_model_dropdown;
        if self.show_model_dropdown {
            self.dropdown_cursor = model_index(&self.selected_model).unwrap_or(0);
        }
    }

    pub fn close_model_dropdown(&mut self) {
        self.show_model_dropdown = false;
    }

    /// Move the dropdown highlight, wrapping at both ends.
    pub fn move_dropdown_cursor(
        &mut self,
        delta: isize,
    ) {
        let len = AVAILABLE_MODELS.len() as isize;
        let next = (self.dropdown_cursor as isize + delta).rem_euclid(len);
        self.dropdown_cursor = next as usize;
    }

    /// Select the highlighted model and close the dropdown.
    pub fn confirm_dropdown(&mut self) {
        if let Some(model) = AVAILABLE_MODELS.get(self.dropdown_cursor) {
            self.select_model(model.id);
        }
    }

    /// Select a catalog model and close the dropdown. Unknown ids are ignored.
    pub fn select_model(
        &mut self,
        id: &str,
    ) -> bool {
        if find_model(id).is_none() {
            return false;
        }
        self.selected_model = id.to_string();
        self.show_model_dropdown = false;
        true
    }

    #[must_use]
    pub fn placeholder(&self) -> &'static str {
        match self.mode {
            ChatMode::Chat => "Message ChatGPT...",
            ChatMode::Image => "Describe the image you want to generate...",
        }
    }

    #[must_use]
    pub fn disclaimer(&self) -> &'static str {
        match self.mode {
            ChatMode::Chat => "ChatGPT can make mistakes. Check important info.",
            ChatMode::Image => "AI-generated images may vary from your description.",
        }
    }

    /// Height of the input box for the given text width.
    #[must_use]
    pub fn input_rows(
        &self,
        width: usize,
    ) -> usize {
        let width = width.max(1);
        let rows: usize = self
            .input
            .split('\n')
            .map(|line| display_width(line).div_ceil(width).max(1))
            .sum();
        rows.clamp(MIN_INPUT_ROWS, MAX_INPUT_ROWS)
    }
}
