//! Instruction-driven text edits.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::completions::TextChoice;
use crate::client::Client;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::operation::Operation;

/// Edit request: rewrite `input` following `instruction`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditRequest {
    /// Model name.
    pub model: String,
    /// How to edit the input.
    pub instruction: String,
    /// Text to edit.
    #[serde(default)]
    pub input: String,
    /// Number of edits to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Nucleus sampling mass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl EditRequest {
    /// Creates an edit request.
    #[must_use]
    pub fn new(
        model: impl Into<String>,
        instruction: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            instruction: instruction.into(),
            input: input.into(),
            ..Self::default()
        }
    }
}

impl Client {
    /// Creates a new edit for the provided input and instruction.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn create_edit(&self, request: &EditRequest) -> Result<Envelope<TextChoice>> {
        self.post_json(Operation::CreateEdit, &[], request).await
    }
}
