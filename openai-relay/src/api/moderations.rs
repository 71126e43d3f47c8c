//! Content moderation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::Client;
use crate::error::Result;
use crate::operation::Operation;

/// Moderation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationRequest {
    /// Text to classify.
    pub input: String,
    /// `text-moderation-latest` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ModerationRequest {
    /// Creates a request with the default model.
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            model: None,
        }
    }

    /// Pins the moderation model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Verdict for one input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
    /// Whether any category was flagged.
    pub flagged: bool,
    /// Category name, e.g. `hate/threatening`, to verdict.
    #[serde(default)]
    pub categories: HashMap<String, bool>,
    /// Score per category.
    #[serde(default)]
    pub category_scores: HashMap<String, f64>,
}

impl ModerationResult {
    /// Whether `category` was flagged.
    #[must_use]
    pub fn is_flagged_for(&self, category: &str) -> bool {
        self.categories.get(category).copied().unwrap_or(false)
    }
}

/// Moderation response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModerationResponse {
    /// Request id.
    #[serde(default)]
    pub id: String,
    /// Moderation model used.
    #[serde(default)]
    pub model: String,
    /// One result per input.
    pub results: Vec<ModerationResult>,
}

impl Client {
    /// Classifies whether text violates the content policy.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, request))]
    pub async fn create_moderation(
        &self,
        request: &ModerationRequest,
    ) -> Result<ModerationResponse> {
        self.post_json(Operation::CreateModeration, &[], request)
            .await
    }
}
