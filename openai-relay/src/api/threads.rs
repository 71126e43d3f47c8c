//! Conversation threads for assistants.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::messages::MessageRequest;
use super::{DeletionStatus, Metadata, ModifyMetadata};
use crate::client::Client;
use crate::error::Result;
use crate::operation::Operation;
use crate::request::Query;

/// A thread.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    /// Thread id.
    pub id: String,
    /// Always `thread`.
    #[serde(default)]
    pub object: String,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub created_at: u64,
    /// Caller metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

/// Create a thread, optionally seeded with messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadRequest {
    /// Initial messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<MessageRequest>>,
    /// Caller metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Client {
    /// Creates a thread.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, request))]
    pub async fn create_thread(&self, request: &ThreadRequest) -> Result<Thread> {
        self.post_json(Operation::CreateThread, &[], request).await
    }

    /// Returns one thread.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn retrieve_thread(&self, thread_id: &str) -> Result<Thread> {
        self.call(Operation::RetrieveThread, &[thread_id], &Query::new())
            .await
    }

    /// Replaces a thread's metadata.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, request))]
    pub async fn modify_thread(&self, thread_id: &str, request: &ModifyMetadata) -> Result<Thread> {
        self.post_json(Operation::ModifyThread, &[thread_id], request)
            .await
    }

    /// Deletes a thread.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn delete_thread(&self, thread_id: &str) -> Result<DeletionStatus> {
        self.call(Operation::DeleteThread, &[thread_id], &Query::new())
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn empty_request_is_empty_object() {
        assert_eq!(
            serde_json::to_value(ThreadRequest::default()).unwrap(),
            serde_json::json!({})
        );
    }

    #[test]
    fn seeded_thread() {
        let request = ThreadRequest {
            messages: Some(vec![MessageRequest::user("Hello")]),
            metadata: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0], serde_json::json!({"role": "user", "content": "Hello"}));
    }
}
