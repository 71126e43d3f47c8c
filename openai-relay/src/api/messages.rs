//! Messages within a thread, and the files attached to them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use super::{ListParams, ListResponse, Metadata, ModifyMetadata};
use crate::client::Client;
use crate::error::Result;
use crate::operation::Operation;
use crate::request::Query;

/// Author of a thread message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Sent by the user.
    #[default]
    User,
    /// Written by an assistant.
    Assistant,
}

/// A new message. Only `user` messages can be created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRequest {
    /// Author role.
    pub role: MessageRole,
    /// Message text.
    pub content: String,
    /// Up to 10 file ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_ids: Option<Vec<String>>,
    /// Caller metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl MessageRequest {
    /// A user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            ..Self::default()
        }
    }
}

/// Text with annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageText {
    /// The text.
    pub value: String,
    /// File citations and file paths.
    #[serde(default)]
    pub annotations: Vec<Value>,
}

/// Reference to a stored image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFileRef {
    /// Id of the image file.
    pub file_id: String,
}

/// One content block of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    /// Text content.
    Text { text: MessageText },
    /// An image file reference.
    ImageFile { image_file: ImageFileRef },
}

/// A thread message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message id.
    pub id: String,
    /// Always `thread.message`.
    #[serde(default)]
    pub object: String,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub created_at: u64,
    /// Owning thread.
    #[serde(default)]
    pub thread_id: String,
    /// Author role.
    #[serde(default)]
    pub role: MessageRole,
    /// Content parts, in order.
    #[serde(default)]
    pub content: Vec<MessageContent>,
    /// Assistant that wrote it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<String>,
    /// Run that produced it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    /// Attached file ids.
    #[serde(default)]
    pub file_ids: Vec<String>,
    /// Caller metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Message {
    /// Concatenated text blocks.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                MessageContent::Text { text } => Some(text.value.as_str()),
                MessageContent::ImageFile { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A file attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFile {
    /// File id.
    pub id: String,
    /// Always `thread.message.file`.
    #[serde(default)]
    pub object: String,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub created_at: u64,
    /// Owning message.
    #[serde(default)]
    pub message_id: String,
}

impl Client {
    /// Adds a message to a thread.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, request))]
    pub async fn create_message(&self, thread_id: &str, request: &MessageRequest) -> Result<Message> {
        self.post_json(Operation::CreateMessage, &[thread_id, "messages"], request)
            .await
    }

    /// Lists messages in a thread.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn list_messages(
        &self,
        thread_id: &str,
        params: &ListParams,
    ) -> Result<ListResponse<Message>> {
        self.call(
            Operation::ListMessages,
            &[thread_id, "messages"],
            &params.to_query(),
        )
        .await
    }

    /// Returns one message.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn retrieve_message(&self, thread_id: &str, message_id: &str) -> Result<Message> {
        self.call(
            Operation::RetrieveMessage,
            &[thread_id, "messages", message_id],
            &Query::new(),
        )
        .await
    }

    /// Replaces a message's metadata.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, request))]
    pub async fn modify_message(
        &self,
        thread_id: &str,
        message_id: &str,
        request: &ModifyMetadata,
    ) -> Result<Message> {
        self.post_json(
            Operation::ModifyMessage,
            &[thread_id, "messages", message_id],
            request,
        )
        .await
    }

    /// Lists files attached to a message.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn list_message_files(
        &self,
        thread_id: &str,
        message_id: &str,
        params: &ListParams,
    ) -> Result<ListResponse<MessageFile>> {
        self.call(
            Operation::ListMessageFiles,
            &[thread_id, "messages", message_id, "files"],
            &params.to_query(),
        )
        .await
    }

    /// Returns one message file.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn retrieve_message_file(
        &self,
        thread_id: &str,
        message_id: &str,
        file_id: &str,
    ) -> Result<MessageFile> {
        self.call(
            Operation::RetrieveMessageFile,
            &[thread_id, "messages", message_id, "files", file_id],
            &Query::new(),
        )
        .await
    }
}
