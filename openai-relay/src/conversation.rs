//! Prompt history for completion-style conversations.
//!
//! [`ConversationHistory`] is owned by the caller and passed to
//! [`Client::complete_with_history`]. It keeps one entry per distinct
//! user/assistant exchange and trims the oldest ones to stay under a
//! character budget.

use std::collections::VecDeque;

use tracing::{debug, instrument};

use crate::api::completions::{CompletionRequest, TextChoice};
use crate::client::Client;
use crate::envelope::Envelope;
use crate::error::Result;

/// Rendered prompt limit in characters, roughly 4000 tokens.
pub const DEFAULT_BUDGET: usize = 16_000;

/// Text placed before the history.
pub const DEFAULT_PREAMBLE: &str = "You are a helpful assistant. Respond conversationally. \
Do not answer as the user.\n\nUser: Hello\nAssistant: Hello! How can I help you today?\n\n";

/// De-duplicated user/assistant exchanges rendered into a completion prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHistory {
    preamble: String,
    exchanges: VecDeque<String>,
    budget: usize,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationHistory {
    /// Empty history with [`DEFAULT_PREAMBLE`] and [`DEFAULT_BUDGET`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            preamble: DEFAULT_PREAMBLE.to_owned(),
            exchanges: VecDeque::new(),
            budget: DEFAULT_BUDGET,
        }
    }

    /// Replaces the preamble.
    #[must_use]
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }

    /// Sets the character budget.
    #[must_use]
    pub const fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    /// Number of stored exchanges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// Whether no exchange is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Stored exchanges, oldest first.
    pub fn exchanges(&self) -> impl Iterator<Item = &str> {
        self.exchanges.iter().map(String::as_str)
    }

    /// Forgets every exchange.
    pub fn clear(&mut self) {
        self.exchanges.clear();
    }

    /// Appends an exchange unless an identical one is already stored.
    pub fn record(&mut self, user: &str, reply: &str) {
        let entry = format!("User: {user}\nAssistant: {reply}\n\n");
        if !self.exchanges.contains(&entry) {
            self.exchanges.push_back(entry);
        }
    }

    /// Renders the prompt for `text`, dropping the oldest exchanges while it
    /// exceeds the budget.
    ///
    /// With no history left the prompt is returned even if it is still over
    /// budget.
    pub fn prompt(&mut self, text: &str) -> String {
        let tail = format!("User: {text}\nAssistant:");
        let fixed = self.preamble.chars().count() + tail.chars().count();
        let mut history: usize = self.exchanges.iter().map(|e| e.chars().count()).sum();

        while fixed + history > self.budget {
            let Some(oldest) = self.exchanges.pop_front() else {
                break;
            };
            history -= oldest.chars().count();
            debug!(remaining = self.exchanges.len(), "Dropped oldest exchange");
        }

        let mut prompt = self.preamble.clone();
        for exchange in &self.exchanges {
            prompt.push_str(exchange);
        }
        prompt.push_str(&tail);
        prompt
    }
}

impl Client {
    /// Sends `text` as a completion prompt carrying the conversation so far,
    /// then records the first returned choice as the reply.
    ///
    /// # Errors
    ///
    /// Any error from [`Client::create_completion`]. The history is left
    /// untouched except for budget trimming.
    #[instrument(skip(self, history, text), fields(model = %model, history = history.len()))]
    pub async fn complete_with_history(
        &self,
        history: &mut ConversationHistory,
        text: &str,
        model: &str,
    ) -> Result<Envelope<TextChoice>> {
        let request = CompletionRequest::new(model, history.prompt(text));
        let response = self.create_completion(&request).await?;
        if let Some(choice) = response.first_choice() {
            history.record(text, choice.text.trim());
        }
        Ok(response)
    }
}
