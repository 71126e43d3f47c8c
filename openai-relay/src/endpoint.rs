//! Operation to (method, path) resolution.
//!
//! Two providers ship with the crate:
//! - [`DirectEndpoints`] - the provider's own path table
//! - [`ProxyEndpoints`] - caller-supplied functions, for routing the whole
//!   client through an intermediary without touching calling code

use std::fmt;
use std::sync::Arc;

use http::Method;

use crate::operation::Operation;

/// Maps an [`Operation`] to its HTTP method and URL path.
///
/// Implementations must be pure: the same operation always resolves to the
/// same pair, and resolution has no side effects.
pub trait EndpointProvider: Send + Sync + fmt::Debug {
    /// URL path for the operation, rooted at the base URL.
    fn path(&self, operation: Operation) -> String;

    /// HTTP method for the operation.
    fn method(&self, operation: Operation) -> Method;

    /// Resolves both halves at once.
    fn resolve(&self, operation: Operation) -> (Method, String) {
        (self.method(operation), self.path(operation))
    }
}

/// The provider's built-in endpoint table.
///
/// Resource identifiers (`/{thread_id}/runs/{run_id}`) are appended by the
/// client as extra path segments, so the table holds collection roots only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectEndpoints;

impl DirectEndpoints {
    /// Default base URL for direct mode.
    pub const BASE_URL: &'static str = "https://api.openai.com";

    const fn path_str(operation: Operation) -> &'static str {
        match operation {
            Operation::CreateCompletion => "/v1/completions",
            Operation::CreateEdit => "/v1/edits",
            Operation::CreateChat => "/v1/chat/completions",
            Operation::CreateEmbedding => "/v1/embeddings",
            Operation::CreateModeration => "/v1/moderations",
            Operation::CreateImage => "/v1/images/generations",
            Operation::CreateImageEdit => "/v1/images/edits",
            Operation::CreateImageVariation => "/v1/images/variations",
            Operation::CreateSpeech => "/v1/audio/speech",
            Operation::CreateTranscription => "/v1/audio/transcriptions",
            Operation::CreateTranslation => "/v1/audio/translations",
            Operation::ListFiles
            | Operation::UploadFile
            | Operation::RetrieveFile
            | Operation::RetrieveFileContent
            | Operation::DeleteFile => "/v1/files",
            Operation::CreateFineTuningJob
            | Operation::ListFineTuningJobs
            | Operation::RetrieveFineTuningJob
            | Operation::CancelFineTuningJob
            | Operation::ListFineTuningEvents => "/v1/fine_tuning/jobs",
            Operation::ListModels | Operation::RetrieveModel | Operation::DeleteModel => {
                "/v1/models"
            }
            Operation::CreateAssistant
            | Operation::ListAssistants
            | Operation::RetrieveAssistant
            | Operation::ModifyAssistant
            | Operation::DeleteAssistant => "/v1/assistants",
            Operation::CreateThreadAndRun => "/v1/threads/runs",
            Operation::CreateThread
            | Operation::RetrieveThread
            | Operation::ModifyThread
            | Operation::DeleteThread
            | Operation::CreateMessage
            | Operation::ListMessages
            | Operation::RetrieveMessage
            | Operation::ModifyMessage
            | Operation::ListMessageFiles
            | Operation::RetrieveMessageFile
            | Operation::CreateRun
            | Operation::ListRuns
            | Operation::RetrieveRun
            | Operation::ModifyRun
            | Operation::SubmitToolOutputs
            | Operation::CancelRun
            | Operation::ListRunSteps
            | Operation::RetrieveRunStep => "/v1/threads",
        }
    }

    fn method_of(operation: Operation) -> Method {
        match operation {
            Operation::ListFiles
            | Operation::RetrieveFile
            | Operation::RetrieveFileContent
            | Operation::ListFineTuningJobs
            | Operation::RetrieveFineTuningJob
            | Operation::ListFineTuningEvents
            | Operation::ListModels
            | Operation::RetrieveModel
            | Operation::ListAssistants
            | Operation::RetrieveAssistant
            | Operation::RetrieveThread
            | Operation::ListMessages
            | Operation::RetrieveMessage
            | Operation::ListMessageFiles
            | Operation::RetrieveMessageFile
            | Operation::ListRuns
            | Operation::RetrieveRun
            | Operation::ListRunSteps
            | Operation::RetrieveRunStep => Method::GET,
            Operation::DeleteFile
            | Operation::DeleteModel
            | Operation::DeleteAssistant
            | Operation::DeleteThread => Method::DELETE,
            Operation::CreateCompletion
            | Operation::CreateEdit
            | Operation::CreateChat
            | Operation::CreateEmbedding
            | Operation::CreateModeration
            | Operation::CreateImage
            | Operation::CreateImageEdit
            | Operation::CreateImageVariation
            | Operation::CreateSpeech
            | Operation::CreateTranscription
            | Operation::CreateTranslation
            | Operation::UploadFile
            | Operation::CreateFineTuningJob
            | Operation::CancelFineTuningJob
            | Operation::CreateAssistant
            | Operation::ModifyAssistant
            | Operation::CreateThread
            | Operation::ModifyThread
            | Operation::CreateMessage
            | Operation::ModifyMessage
            | Operation::CreateRun
            | Operation::ModifyRun
            | Operation::SubmitToolOutputs
            | Operation::CancelRun
            | Operation::CreateThreadAndRun => Method::POST,
        }
    }
}

impl EndpointProvider for DirectEndpoints {
    fn path(&self, operation: Operation) -> String {
        Self::path_str(operation).to_owned()
    }

    fn method(&self, operation: Operation) -> Method {
        Self::method_of(operation)
    }
}

type PathFn = dyn Fn(Operation) -> String + Send + Sync;
type MethodFn = dyn Fn(Operation) -> Method + Send + Sync;

/// Caller-defined endpoint mapping.
///
/// Output is passed through untouched. An empty path is rejected later by the
/// request builder, not here.
#[derive(Clone)]
pub struct ProxyEndpoints {
    path: Arc<PathFn>,
    method: Arc<MethodFn>,
}

impl ProxyEndpoints {
    /// Creates a proxy mapping from a path function and a method function.
    pub fn new<P, M>(path: P, method: M) -> Self
    where
        P: Fn(Operation) -> String + Send + Sync + 'static,
        M: Fn(Operation) -> Method + Send + Sync + 'static,
    {
        Self {
            path: Arc::new(path),
            method: Arc::new(method),
        }
    }

    /// Proxy that keeps the provider's methods and rewrites only paths.
    pub fn with_paths<P>(path: P) -> Self
    where
        P: Fn(Operation) -> String + Send + Sync + 'static,
    {
        Self::new(path, DirectEndpoints::method_of)
    }
}

impl fmt::Debug for ProxyEndpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyEndpoints").finish_non_exhaustive()
    }
}

impl EndpointProvider for ProxyEndpoints {
    fn path(&self, operation: Operation) -> String {
        (self.path)(operation)
    }

    fn method(&self, operation: Operation) -> Method {
        (self.method)(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod direct {
        use super::*;

        #[test]
        fn mapping_is_total() {
            for op in Operation::ALL {
                let (method, path) = DirectEndpoints.resolve(op);
                assert!(path.starts_with("/v1/"), "{op}: {path}");
                assert!(
                    [Method::GET, Method::POST, Method::DELETE].contains(&method),
                    "{op}: {method}"
                );
            }
        }

        #[test]
        fn known_routes() {
            assert_eq!(
                DirectEndpoints.resolve(Operation::CreateChat),
                (Method::POST, "/v1/chat/completions".to_owned())
            );
            assert_eq!(
                DirectEndpoints.resolve(Operation::ListFiles),
                (Method::GET, "/v1/files".to_owned())
            );
            assert_eq!(
                DirectEndpoints.resolve(Operation::DeleteModel),
                (Method::DELETE, "/v1/models".to_owned())
            );
            assert_eq!(
                DirectEndpoints.resolve(Operation::CreateThreadAndRun),
                (Method::POST, "/v1/threads/runs".to_owned())
            );
        }
    }

    mod proxy {
        use super::*;

        #[test]
        fn passes_output_through() {
            let f = |op: Operation| format!("/relay/{op}");
            let g = |op: Operation| {
                if op == Operation::ListModels {
                    Method::PUT
                } else {
                    Method::PATCH
                }
            };
            let proxy = ProxyEndpoints::new(f, g);

            for op in Operation::ALL {
                assert_eq!(proxy.resolve(op), (g(op), f(op)));
            }
        }

        #[test]
        fn empty_path_is_not_rewritten() {
            let proxy = ProxyEndpoints::new(|_| String::new(), |_| Method::POST);
            assert_eq!(proxy.path(Operation::CreateChat), "");
        }

        #[test]
        fn with_paths_keeps_direct_methods() {
            let proxy = ProxyEndpoints::with_paths(|op| format!("/gateway/{op}"));
            for op in Operation::ALL {
                assert_eq!(proxy.method(op), DirectEndpoints.method(op));
            }
        }
    }
}
