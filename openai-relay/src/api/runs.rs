//! Runs: an assistant working on a thread, and the steps it takes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use super::assistants::Tool;
use super::threads::ThreadRequest;
use super::{ListParams, ListResponse, Metadata, ModifyMetadata};
use crate::client::Client;
use crate::error::Result;
use crate::operation::Operation;
use crate::request::Query;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Waiting to start.
    #[default]
    Queued,
    /// Running.
    InProgress,
    /// Waiting for tool outputs.
    RequiresAction,
    /// Cancel requested.
    Cancelling,
    /// Cancelled.
    Cancelled,
    /// Failed, see `last_error`.
    Failed,
    /// Finished successfully.
    Completed,
    /// Timed out.
    Expired,
}

impl RunStatus {
    /// Whether the run can no longer change.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::Failed | Self::Completed | Self::Expired
        )
    }
}

/// A function invocation requested by the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name.
    pub name: String,
    /// JSON-encoded arguments.
    #[serde(default)]
    pub arguments: String,
}

/// A tool call awaiting output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Id to answer with a tool output.
    pub id: String,
    /// Always `function`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// The requested function call.
    pub function: FunctionCall,
}

/// Tool calls the caller must answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitToolOutputsAction {
    /// Calls awaiting output.
    pub tool_calls: Vec<ToolCall>,
}

/// What a `requires_action` run is waiting for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredAction {
    /// Always `submit_tool_outputs`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// The tool calls to answer.
    pub submit_tool_outputs: SubmitToolOutputsAction,
}

/// Error reported by a run or step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastError {
    /// `server_error` or `rate_limit_exceeded`.
    #[serde(default)]
    pub code: String,
    /// Human readable message.
    #[serde(default)]
    pub message: String,
}

/// A run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Run id.
    pub id: String,
    /// Always `thread.run`.
    #[serde(default)]
    pub object: String,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub created_at: u64,
    /// Owning thread.
    #[serde(default)]
    pub thread_id: String,
    /// Assistant being run.
    #[serde(default)]
    pub assistant_id: String,
    /// Current status.
    #[serde(default)]
    pub status: RunStatus,
    /// Set while `requires_action`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_action: Option<RequiredAction>,
    /// Last failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<LastError>,
    /// Unix timestamp in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
    /// Unix timestamp in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<u64>,
    /// Unix timestamp in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<u64>,
    /// Unix timestamp in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<u64>,
    /// Unix timestamp in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<u64>,
    /// Model used.
    #[serde(default)]
    pub model: String,
    /// Instructions used.
    #[serde(default)]
    pub instructions: String,
    /// Tools used.
    #[serde(default)]
    pub tools: Vec<Tool>,
    /// Attached file ids.
    #[serde(default)]
    pub file_ids: Vec<String>,
    /// Caller metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

/// Start a run on an existing thread.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Assistant to run.
    pub assistant_id: String,
    /// Overrides the assistant's model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Overrides the assistant's instructions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Overrides the assistant tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    /// Caller metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl RunRequest {
    /// Runs `assistant_id` with its own settings.
    #[must_use]
    pub fn new(assistant_id: impl Into<String>) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            ..Self::default()
        }
    }
}

/// Create a thread and run it in one call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadRunRequest {
    /// Assistant to run.
    pub assistant_id: String,
    /// Thread to create.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<ThreadRequest>,
    /// Overrides the assistant model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Overrides the assistant instructions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Overrides the assistant tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    /// Caller metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Output of one tool call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Call being answered.
    pub tool_call_id: String,
    /// Result passed back to the model.
    pub output: String,
}

impl ToolOutput {
    /// Answers `tool_call_id`.
    #[must_use]
    pub fn new(tool_call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            output: output.into(),
        }
    }
}

#[derive(Serialize)]
struct ToolOutputs<'a> {
    tool_outputs: &'a [ToolOutput],
}

/// What a step did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepDetails {
    /// The step created a message.
    MessageCreation { message_creation: MessageCreation },
    /// Code interpreter, retrieval or function calls, kept as raw JSON.
    ToolCalls { tool_calls: Vec<Value> },
}

/// The message a step created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCreation {
    /// Created message id.
    pub message_id: String,
}

/// One step of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStep {
    /// Step id.
    pub id: String,
    /// Always `thread.run.step`.
    #[serde(default)]
    pub object: String,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub created_at: u64,
    /// Assistant being run.
    #[serde(default)]
    pub assistant_id: String,
    /// Owning thread.
    #[serde(default)]
    pub thread_id: String,
    /// Owning run.
    #[serde(default)]
    pub run_id: String,
    /// `message_creation` or `tool_calls`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// `in_progress`, `cancelled`, `failed`, `completed` or `expired`.
    #[serde(default)]
    pub status: String,
    /// What the step did.
    pub step_details: StepDetails,
    /// Last failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<LastError>,
    /// Unix timestamp in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<u64>,
    /// Unix timestamp in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<u64>,
    /// Unix timestamp in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<u64>,
    /// Unix timestamp in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<u64>,
    /// Caller metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Client {
    /// Starts a run.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, request), fields(assistant = %request.assistant_id))]
    pub async fn create_run(&self, thread_id: &str, request: &RunRequest) -> Result<Run> {
        self.post_json(Operation::CreateRun, &[thread_id, "runs"], request)
            .await
    }

    /// Lists runs on a thread.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn list_runs(&self, thread_id: &str, params: &ListParams) -> Result<ListResponse<Run>> {
        self.call(Operation::ListRuns, &[thread_id, "runs"], &params.to_query())
            .await
    }

    /// Returns one run.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.call(
            Operation::RetrieveRun,
            &[thread_id, "runs", run_id],
            &Query::new(),
        )
        .await
    }

    /// Replaces a run's metadata.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, request))]
    pub async fn modify_run(
        &self,
        thread_id: &str,
        run_id: &str,
        request: &ModifyMetadata,
    ) -> Result<Run> {
        self.post_json(Operation::ModifyRun, &[thread_id, "runs", run_id], request)
            .await
    }

    /// Answers the tool calls of a `requires_action` run.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, outputs), fields(outputs = outputs.len()))]
    pub async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run> {
        self.post_json(
            Operation::SubmitToolOutputs,
            &[thread_id, "runs", run_id, "submit_tool_outputs"],
            &ToolOutputs {
                tool_outputs: outputs,
            },
        )
        .await
    }

    /// Cancels an in-progress run.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.call(
            Operation::CancelRun,
            &[thread_id, "runs", run_id, "cancel"],
            &Query::new(),
        )
        .await
    }

    /// Creates a thread and starts a run on it.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, request), fields(assistant = %request.assistant_id))]
    pub async fn create_thread_and_run(&self, request: &ThreadRunRequest) -> Result<Run> {
        self.post_json(Operation::CreateThreadAndRun, &[], request)
            .await
    }

    /// Lists the steps of a run.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn list_run_steps(
        &self,
        thread_id: &str,
        run_id: &str,
        params: &ListParams,
    ) -> Result<ListResponse<RunStep>> {
        self.call(
            Operation::ListRunSteps,
            &[thread_id, "runs", run_id, "steps"],
            &params.to_query(),
        )
        .await
    }

    /// Returns one run step.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn retrieve_run_step(
        &self,
        thread_id: &str,
        run_id: &str,
        step_id: &str,
    ) -> Result<RunStep> {
        self.call(
            Operation::RetrieveRunStep,
            &[thread_id, "runs", run_id, "steps", step_id],
            &Query::new(),
        )
        .await
    }
}
