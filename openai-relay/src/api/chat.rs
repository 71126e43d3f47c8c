//! Chat completions, buffered and streamed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::Client;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::operation::Operation;
use crate::request::{Query, RequestBody};
use crate::stream::{EventStream, StreamDecoder};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instructions for the model.
    System,
    /// Human turn.
    User,
    /// Model turn.
    Assistant,
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote the message.
    pub role: ChatRole,
    /// Message text.
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    /// Creates a message.
    #[must_use]
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// Chat completion request.
///
/// `stream` is not part of the request; pick [`Client::create_chat`] or
/// [`Client::create_chat_stream`] instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model name.
    pub model: String,
    /// Conversation so far.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Nucleus sampling mass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Number of choices to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    /// Stop sequences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Penalty for tokens already present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    /// Penalty proportional to token frequency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    /// Token id to bias, -100 to 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<HashMap<String, f32>>,
    /// User identifier for abuse detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl ChatRequest {
    /// Creates a request with the given messages.
    #[must_use]
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            ..Self::default()
        }
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the output token limit.
    #[must_use]
    pub const fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the user identifier.
    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

#[derive(Serialize)]
struct StreamingChatRequest<'a> {
    #[serde(flatten)]
    request: &'a ChatRequest,
    stream: bool,
}

/// One choice of a buffered chat response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageChoice {
    /// Position in the choices array.
    #[serde(default)]
    pub index: u32,
    /// The generated message.
    pub message: ChatMessage,
    /// Why generation stopped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Incremental message content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatDelta {
    /// Set on the first chunk only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ChatRole>,
    /// Text fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// One choice of a streamed chat chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChoice {
    /// Position in the choices array.
    #[serde(default)]
    pub index: u32,
    /// Incremental update.
    #[serde(default)]
    pub delta: ChatDelta,
    /// Set on the last chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl Client {
    /// Creates a chat completion.
    ///
    /// A `200 OK` body carrying an `{"error": ...}` payload is reported as
    /// [`Error::Api`](crate::Error::Api) with no status.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn create_chat(&self, request: &ChatRequest) -> Result<Envelope<MessageChoice>> {
        debug!("Sending chat request");
        let body = self
            .send_raw(
                Operation::CreateChat,
                &[],
                RequestBody::json(request)?,
                &Query::new(),
            )
            .await?;
        Self::reject_embedded_error(&body)?;
        Self::decode(Operation::CreateChat, &body)
    }

    /// Creates a streamed chat completion.
    ///
    /// # Errors
    ///
    /// Errors opening the stream. Per-event errors arrive through the stream.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn create_chat_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<EventStream<StreamChoice>> {
        debug!("Sending streaming chat request");
        let body = StreamingChatRequest {
            request,
            stream: true,
        };
        self.open_event_stream(Operation::CreateChat, &body).await
    }

    /// Streams a chat completion into callbacks.
    ///
    /// `on_event` runs once per chunk, `on_complete` once after a normal end.
    /// Keep the returned decoder alive for as long as events are wanted.
    ///
    /// # Errors
    ///
    /// Errors opening the stream, or no tokio runtime.
    pub async fn stream_chat<E, C>(
        &self,
        request: &ChatRequest,
        on_event: E,
        on_complete: C,
    ) -> Result<StreamDecoder>
    where
        E: FnMut(Result<Envelope<StreamChoice>>) + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        let stream = self.create_chat_stream(request).await?;
        let mut decoder = StreamDecoder::new();
        decoder.connect(stream, on_event, on_complete)?;
        Ok(decoder)
    }
}
