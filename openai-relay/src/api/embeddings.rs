//! Vector embeddings.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::Client;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::operation::Operation;

/// Text to embed: one string or a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    /// One text.
    Single(String),
    /// Several texts, embedded in order.
    Batch(Vec<String>),
}

impl From<String> for EmbeddingInput {
    fn from(s: String) -> Self {
        Self::Single(s)
    }
}

impl From<&str> for EmbeddingInput {
    fn from(s: &str) -> Self {
        Self::Single(s.to_owned())
    }
}

impl From<Vec<String>> for EmbeddingInput {
    fn from(v: Vec<String>) -> Self {
        Self::Batch(v)
    }
}

/// Embedding request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// Embedding model.
    pub model: String,
    /// Text to embed.
    pub input: EmbeddingInput,
    /// End-user id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl EmbeddingRequest {
    /// Creates an embedding request.
    #[must_use]
    pub fn new(model: impl Into<String>, input: impl Into<EmbeddingInput>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            user: None,
        }
    }
}

/// One embedding vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingData {
    /// Always `embedding`.
    #[serde(default)]
    pub object: String,
    /// Position of the matching input.
    #[serde(default)]
    pub index: u32,
    /// The vector.
    pub embedding: Vec<f32>,
}

impl Client {
    /// Creates an embedding vector for each input.
    ///
    /// Vectors arrive in the envelope's `data`.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn create_embedding(
        &self,
        request: &EmbeddingRequest,
    ) -> Result<Envelope<EmbeddingData>> {
        self.post_json(Operation::CreateEmbedding, &[], request)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn input_is_untagged() {
        let single = serde_json::to_value(EmbeddingRequest::new("e", "hello")).unwrap();
        assert_eq!(single["input"], "hello");

        let batch =
            serde_json::to_value(EmbeddingRequest::new("e", vec!["a".to_owned(), "b".to_owned()]))
                .unwrap();
        assert_eq!(batch["input"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn vectors_land_in_data() {
        let env: Envelope<EmbeddingData> = serde_json::from_str(
            r#"{"object":"list","model":"text-embedding-ada-002","data":[{"object":"embedding","index":0,"embedding":[0.5,-0.25]}],"usage":{"prompt_tokens":2,"total_tokens":2}}"#,
        )
        .unwrap();
        assert_eq!(env.data()[0].embedding, [0.5, -0.25]);
        assert!(env.choices().is_empty());
        assert_eq!(env.usage.unwrap().total_tokens, Some(2));
    }
}
