//! Fine-tuning jobs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use super::{ListParams, ListResponse};
use crate::client::Client;
use crate::error::Result;
use crate::operation::Operation;
use crate::request::Query;

/// Training hyperparameters. Each value is a number or `"auto"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// A number or `"auto"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<Value>,
    /// A number or `"auto"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_rate_multiplier: Option<Value>,
    /// A number or `"auto"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_epochs: Option<Value>,
}

/// Request to start a fine-tuning job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FineTuningJobRequest {
    /// Base model.
    pub model: String,
    /// Id of an uploaded `fine-tune` file.
    pub training_file: String,
    /// Training settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperparameters: Option<Hyperparameters>,
    /// Up to 18 characters added to the fine-tuned model name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    /// Uploaded validation file id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_file: Option<String>,
}

impl FineTuningJobRequest {
    /// Creates a job request.
    #[must_use]
    pub fn new(model: impl Into<String>, training_file: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            training_file: training_file.into(),
            ..Self::default()
        }
    }
}

/// Why a job failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineTuningError {
    /// Machine readable code.
    #[serde(default)]
    pub code: String,
    /// Human readable message.
    #[serde(default)]
    pub message: String,
    /// Parameter that caused the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

/// A fine-tuning job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FineTuningJob {
    /// Job id.
    pub id: String,
    /// Always `fine_tuning.job`.
    #[serde(default)]
    pub object: String,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub created_at: u64,
    /// Unix timestamp in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<u64>,
    /// Base model.
    #[serde(default)]
    pub model: String,
    /// Resulting model, once finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fine_tuned_model: Option<String>,
    /// Owning organization.
    #[serde(default)]
    pub organization_id: String,
    /// `validating_files`, `queued`, `running`, `succeeded`, `failed` or
    /// `cancelled`.
    #[serde(default)]
    pub status: String,
    /// Settings in effect.
    #[serde(default)]
    pub hyperparameters: Hyperparameters,
    /// Training file id.
    #[serde(default)]
    pub training_file: String,
    /// Validation file id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_file: Option<String>,
    /// Result file ids.
    #[serde(default)]
    pub result_files: Vec<String>,
    /// Tokens processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_tokens: Option<u64>,
    /// Set when the job failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FineTuningError>,
}

/// A job status event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineTuningEvent {
    /// Event id.
    pub id: String,
    /// Always `fine_tuning.job.event`.
    #[serde(default)]
    pub object: String,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub created_at: u64,
    /// `info`, `warn` or `error`.
    #[serde(default)]
    pub level: String,
    /// Event text.
    #[serde(default)]
    pub message: String,
}

/// Fine-tuning lists page with `after` and `limit` only.
fn page_query(params: &ListParams) -> Query {
    Query::new()
        .push_opt("after", params.after.as_deref())
        .push_opt("limit", params.limit)
}

impl Client {
    /// Starts a fine-tuning job.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn create_fine_tuning_job(
        &self,
        request: &FineTuningJobRequest,
    ) -> Result<FineTuningJob> {
        self.post_json(Operation::CreateFineTuningJob, &[], request)
            .await
    }

    /// Lists fine-tuning jobs.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn list_fine_tuning_jobs(
        &self,
        params: &ListParams,
    ) -> Result<ListResponse<FineTuningJob>> {
        self.call(Operation::ListFineTuningJobs, &[], &page_query(params))
            .await
    }

    /// Returns one job.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn retrieve_fine_tuning_job(&self, job_id: &str) -> Result<FineTuningJob> {
        self.call(Operation::RetrieveFineTuningJob, &[job_id], &Query::new())
            .await
    }

    /// Cancels a running job.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn cancel_fine_tuning_job(&self, job_id: &str) -> Result<FineTuningJob> {
        self.call(
            Operation::CancelFineTuningJob,
            &[job_id, "cancel"],
            &Query::new(),
        )
        .await
    }

    /// Lists status events for a job.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn list_fine_tuning_events(
        &self,
        job_id: &str,
        params: &ListParams,
    ) -> Result<ListResponse<FineTuningEvent>> {
        self.call(
            Operation::ListFineTuningEvents,
            &[job_id, "events"],
            &page_query(params),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::api::Order;

    #[test]
    fn page_query_ignores_order_and_before() {
        let params = ListParams::default()
            .limit(3)
            .after("ftjob-1")
            .order(Order::Asc)
            .before("ftjob-9");
        let query = page_query(&params);
        let pairs: Vec<_> = query.iter().collect();
        assert_eq!(pairs, [("after", "ftjob-1"), ("limit", "3")]);
    }

    #[test]
    fn job_decodes_with_auto_hyperparameters() {
        let job: FineTuningJob = serde_json::from_str(
            r#"{"id":"ftjob-abc","object":"fine_tuning.job","created_at":1692661014,
                "finished_at":null,"model":"gpt-3.5-turbo-0613","fine_tuned_model":null,
                "organization_id":"org-1","status":"running",
                "hyperparameters":{"n_epochs":"auto"},"training_file":"file-1",
                "validation_file":null,"result_files":[],"trained_tokens":null}"#,
        )
        .unwrap();
        assert_eq!(job.status, "running");
        assert_eq!(job.hyperparameters.n_epochs, Some(Value::from("auto")));
        assert!(job.error.is_none());
    }
}
