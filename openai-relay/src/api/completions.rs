//! Legacy text completions.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::Client;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::operation::Operation;

/// Text completion request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model name.
    pub model: String,
    /// Prompt text.
    pub prompt: String,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Nucleus sampling mass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Number of completions to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    /// Stop sequences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    /// Penalty for tokens already present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    /// Penalty proportional to token frequency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    /// User identifier for abuse detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl CompletionRequest {
    /// Creates a request for `prompt`.
    #[must_use]
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Sets the output token limit.
    #[must_use]
    pub const fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// One generated text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextChoice {
    /// Generated text.
    #[serde(default)]
    pub text: String,
    /// Position in the choices array.
    #[serde(default)]
    pub index: u32,
    /// Why generation stopped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl Client {
    /// Creates a completion for the provided prompt.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn create_completion(
        &self,
        request: &CompletionRequest,
    ) -> Result<Envelope<TextChoice>> {
        self.post_json(Operation::CreateCompletion, &[], request)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn unset_options_are_omitted() {
        let json = serde_json::to_value(CompletionRequest::new("gpt-3.5-turbo-instruct", "Hi"))
            .unwrap();
        assert_eq!(json, serde_json::json!({"model": "gpt-3.5-turbo-instruct", "prompt": "Hi"}));
    }

    #[test]
    fn round_trips() {
        let request = CompletionRequest::new("m", "Write a haiku")
            .max_tokens(64)
            .temperature(0.25);
        let back: CompletionRequest =
            serde_json::from_slice(&serde_json::to_vec(&request).unwrap()).unwrap();
        assert_eq!(back, request);
    }
}
