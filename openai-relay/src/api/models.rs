//! Available models.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{DeletionStatus, ListResponse};
use crate::client::Client;
use crate::error::Result;
use crate::operation::Operation;
use crate::request::Query;

/// A model the API key can use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Model id.
    pub id: String,
    /// Always `model`.
    #[serde(default)]
    pub object: String,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub created: u64,
    /// Owning organization.
    #[serde(default)]
    pub owned_by: String,
}

impl Client {
    /// Lists available models.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn list_models(&self) -> Result<ListResponse<Model>> {
        self.call(Operation::ListModels, &[], &Query::new()).await
    }

    /// Returns one model.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn retrieve_model(&self, model: &str) -> Result<Model> {
        self.call(Operation::RetrieveModel, &[model], &Query::new())
            .await
    }

    /// Deletes a fine-tuned model owned by the organization.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn delete_model(&self, model: &str) -> Result<DeletionStatus> {
        self.call(Operation::DeleteModel, &[model], &Query::new())
            .await
    }
}
