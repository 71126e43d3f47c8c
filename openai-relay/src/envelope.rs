//! The loose response shape shared by completion-style endpoints.

use serde::{Deserialize, Serialize};

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u32>,
    /// Tokens in the generated output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,
    /// Sum of both.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u32>,
}

/// Generic response wrapper.
///
/// Every field is optional: completions fill `choices`, embeddings and images
/// fill `data`, and a bare `{}` is a valid (empty) envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Response id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Object type, e.g. `chat.completion`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    /// Unix timestamp in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,
    /// Model that produced the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Completion and chat results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<T>>,
    /// Token usage, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// Embedding and image results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<T>>,
}

impl<T> Default for Envelope<T> {
    fn default() -> Self {
        Self {
            id: None,
            object: None,
            created: None,
            model: None,
            choices: None,
            usage: None,
            data: None,
        }
    }
}

impl<T> Envelope<T> {
    /// Choices, or an empty slice.
    #[must_use]
    pub fn choices(&self) -> &[T] {
        self.choices.as_deref().unwrap_or_default()
    }

    /// Data items, or an empty slice.
    #[must_use]
    pub fn data(&self) -> &[T] {
        self.data.as_deref().unwrap_or_default()
    }

    /// The first choice, if any.
    #[must_use]
    pub fn first_choice(&self) -> Option<&T> {
        self.choices().first()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_all_absent() {
        let env: Envelope<serde_json::Value> = serde_json::from_str("{}").unwrap();
        assert_eq!(env, Envelope::default());
        assert!(env.choices().is_empty());
        assert!(env.data().is_empty());
        assert!(env.first_choice().is_none());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let env: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"id":"x","system_fingerprint":"fp_1","choices":[1,2]}"#)
                .unwrap();
        assert_eq!(env.id.as_deref(), Some("x"));
        assert_eq!(env.choices().len(), 2);
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let env = Envelope::<u8> {
            model: Some("m".into()),
            ..Envelope::default()
        };
        assert_eq!(serde_json::to_string(&env).unwrap(), r#"{"model":"m"}"#);
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Choice {
        text: String,
    }

    #[test]
    fn choice_type_needs_no_default() {
        let env: Envelope<Choice> = serde_json::from_str("{}").unwrap();
        assert!(env.choices.is_none());

        let env: Envelope<Choice> =
            serde_json::from_str(r#"{"choices":[{"text":"hi"}]}"#).unwrap();
        assert_eq!(env.first_choice().map(|c| c.text.as_str()), Some("hi"));
        assert!(env.data.is_none());
    }
}
