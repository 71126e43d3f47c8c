//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use openai_relay::prelude::*;
//! ```

pub use crate::api::assistants::{Assistant, AssistantRequest, FunctionDefinition, Tool};
pub use crate::api::audio::{
    SpeechFormat, SpeechRequest, TranscriptFormat, Transcription, TranscriptionRequest,
    TranslationRequest, Voice,
};
pub use crate::api::chat::{ChatDelta, ChatMessage, ChatRequest, ChatRole, MessageChoice, StreamChoice};
pub use crate::api::completions::{CompletionRequest, TextChoice};
pub use crate::api::edits::EditRequest;
pub use crate::api::embeddings::{EmbeddingData, EmbeddingInput, EmbeddingRequest};
pub use crate::api::files::{FileObject, FilePurpose, FileUpload};
pub use crate::api::fine_tuning::{
    FineTuningEvent, FineTuningJob, FineTuningJobRequest, Hyperparameters,
};
pub use crate::api::images::{
    ImageData, ImageEditRequest, ImageFile, ImageFormat, ImageRequest, ImageSize,
    ImageVariationRequest,
};
pub use crate::api::messages::{Message, MessageContent, MessageFile, MessageRequest, MessageRole};
pub use crate::api::models::Model;
pub use crate::api::moderations::{ModerationRequest, ModerationResponse, ModerationResult};
pub use crate::api::runs::{Run, RunRequest, RunStatus, RunStep, ThreadRunRequest, ToolOutput};
pub use crate::api::threads::{Thread, ThreadRequest};
pub use crate::api::{DeletionStatus, ListParams, ListResponse, Metadata, ModifyMetadata, Order};

pub use crate::{
    Authorizer, BearerAuth, Client, ClientBuilder, ClientConfig, ConversationHistory,
    DecoderState, DirectEndpoints, EndpointProvider, Envelope, Error, EventStream, Operation,
    ProxyEndpoints, Result, StreamDecoder, Transport, Usage,
};
