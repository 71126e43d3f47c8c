//! The closed set of logical API operations.

use std::fmt;

/// A logical API action, independent of its wire-level method and path.
///
/// Operations carry no data. They are lookup keys for an
/// [`EndpointProvider`](crate::endpoint::EndpointProvider).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Operation {
    /// Text completion.
    CreateCompletion,
    /// Instruction-driven text edit.
    CreateEdit,
    /// Chat completion, plain or streamed.
    CreateChat,
    /// Embedding vectors.
    CreateEmbedding,
    /// Content classification.
    CreateModeration,

    /// Image from a prompt.
    CreateImage,
    /// Edit of an uploaded image.
    CreateImageEdit,
    /// Variation of an uploaded image.
    CreateImageVariation,

    /// Text to speech.
    CreateSpeech,
    /// Speech to text.
    CreateTranscription,
    /// Speech to English text.
    CreateTranslation,

    /// Uploaded files.
    ListFiles,
    /// File upload.
    UploadFile,
    /// One file.
    RetrieveFile,
    /// Raw file contents.
    RetrieveFileContent,
    /// File deletion.
    DeleteFile,

    /// Start a fine-tuning job.
    CreateFineTuningJob,
    /// Fine-tuning jobs.
    ListFineTuningJobs,
    /// One fine-tuning job.
    RetrieveFineTuningJob,
    /// Stop a fine-tuning job.
    CancelFineTuningJob,
    /// Events of a fine-tuning job.
    ListFineTuningEvents,

    /// Available models.
    ListModels,
    /// One model.
    RetrieveModel,
    /// Fine-tuned model deletion.
    DeleteModel,

    /// New assistant.
    CreateAssistant,
    /// Assistants.
    ListAssistants,
    /// One assistant.
    RetrieveAssistant,
    /// Assistant update.
    ModifyAssistant,
    /// Assistant deletion.
    DeleteAssistant,

    /// New thread.
    CreateThread,
    /// One thread.
    RetrieveThread,
    /// Thread metadata update.
    ModifyThread,
    /// Thread deletion.
    DeleteThread,

    /// New message in a thread.
    CreateMessage,
    /// Messages of a thread.
    ListMessages,
    /// One message.
    RetrieveMessage,
    /// Message metadata update.
    ModifyMessage,
    /// Files attached to a message.
    ListMessageFiles,
    /// One message file.
    RetrieveMessageFile,

    /// Run an assistant on a thread.
    CreateRun,
    /// Runs of a thread.
    ListRuns,
    /// One run.
    RetrieveRun,
    /// Run metadata update.
    ModifyRun,
    /// Answer the tool calls of a waiting run.
    SubmitToolOutputs,
    /// Stop a run.
    CancelRun,
    /// New thread and run in one call.
    CreateThreadAndRun,
    /// Steps of a run.
    ListRunSteps,
    /// One run step.
    RetrieveRunStep,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 48] = [
        Self::CreateCompletion,
        Self::CreateEdit,
        Self::CreateChat,
        Self::CreateEmbedding,
        Self::CreateModeration,
        Self::CreateImage,
        Self::CreateImageEdit,
        Self::CreateImageVariation,
        Self::CreateSpeech,
        Self::CreateTranscription,
        Self::CreateTranslation,
        Self::ListFiles,
        Self::UploadFile,
        Self::RetrieveFile,
        Self::RetrieveFileContent,
        Self::DeleteFile,
        Self::CreateFineTuningJob,
        Self::ListFineTuningJobs,
        Self::RetrieveFineTuningJob,
        Self::CancelFineTuningJob,
        Self::ListFineTuningEvents,
        Self::ListModels,
        Self::RetrieveModel,
        Self::DeleteModel,
        Self::CreateAssistant,
        Self::ListAssistants,
        Self::RetrieveAssistant,
        Self::ModifyAssistant,
        Self::DeleteAssistant,
        Self::CreateThread,
        Self::RetrieveThread,
        Self::ModifyThread,
        Self::DeleteThread,
        Self::CreateMessage,
        Self::ListMessages,
        Self::RetrieveMessage,
        Self::ModifyMessage,
        Self::ListMessageFiles,
        Self::RetrieveMessageFile,
        Self::CreateRun,
        Self::ListRuns,
        Self::RetrieveRun,
        Self::ModifyRun,
        Self::SubmitToolOutputs,
        Self::CancelRun,
        Self::CreateThreadAndRun,
        Self::ListRunSteps,
        Self::RetrieveRunStep,
    ];

    /// Stable kebab-case identifier, e.g. `create-chat`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateCompletion => "create-completion",
            Self::CreateEdit => "create-edit",
            Self::CreateChat => "create-chat",
            Self::CreateEmbedding => "create-embedding",
            Self::CreateModeration => "create-moderation",
            Self::CreateImage => "create-image",
            Self::CreateImageEdit => "create-image-edit",
            Self::CreateImageVariation => "create-image-variation",
            Self::CreateSpeech => "create-speech",
            Self::CreateTranscription => "create-transcription",
            Self::CreateTranslation => "create-translation",
            Self::ListFiles => "list-files",
            Self::UploadFile => "upload-file",
            Self::RetrieveFile => "retrieve-file",
            Self::RetrieveFileContent => "retrieve-file-content",
            Self::DeleteFile => "delete-file",
            Self::CreateFineTuningJob => "create-fine-tuning-job",
            Self::ListFineTuningJobs => "list-fine-tuning-jobs",
            Self::RetrieveFineTuningJob => "retrieve-fine-tuning-job",
            Self::CancelFineTuningJob => "cancel-fine-tuning-job",
            Self::ListFineTuningEvents => "list-fine-tuning-events",
            Self::ListModels => "list-models",
            Self::RetrieveModel => "retrieve-model",
            Self::DeleteModel => "delete-model",
            Self::CreateAssistant => "create-assistant",
            Self::ListAssistants => "list-assistants",
            Self::RetrieveAssistant => "retrieve-assistant",
            Self::ModifyAssistant => "modify-assistant",
            Self::DeleteAssistant => "delete-assistant",
            Self::CreateThread => "create-thread",
            Self::RetrieveThread => "retrieve-thread",
            Self::ModifyThread => "modify-thread",
            Self::DeleteThread => "delete-thread",
            Self::CreateMessage => "create-message",
            Self::ListMessages => "list-messages",
            Self::RetrieveMessage => "retrieve-message",
            Self::ModifyMessage => "modify-message",
            Self::ListMessageFiles => "list-message-files",
            Self::RetrieveMessageFile => "retrieve-message-file",
            Self::CreateRun => "create-run",
            Self::ListRuns => "list-runs",
            Self::RetrieveRun => "retrieve-run",
            Self::ModifyRun => "modify-run",
            Self::SubmitToolOutputs => "submit-tool-outputs",
            Self::CancelRun => "cancel-run",
            Self::CreateThreadAndRun => "create-thread-and-run",
            Self::ListRunSteps => "list-run-steps",
            Self::RetrieveRunStep => "retrieve-run-step",
        }
    }

    /// Whether the request body is `multipart/form-data`.
    #[must_use]
    pub const fn is_multipart(self) -> bool {
        matches!(
            self,
            Self::CreateImageEdit
                | Self::CreateImageVariation
                | Self::CreateTranscription
                | Self::CreateTranslation
                | Self::UploadFile
        )
    }

    /// Whether the operation can answer with a server-sent event stream.
    #[must_use]
    pub const fn supports_streaming(self) -> bool {
        matches!(self, Self::CreateChat)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
