//! Assistants: models with instructions, tools and files.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use super::{DeletionStatus, ListParams, ListResponse, Metadata};
use crate::client::Client;
use crate::error::Result;
use crate::operation::Operation;
use crate::request::Query;

/// A function the model may call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Function name.
    pub name: String,
    /// What the function does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema of the arguments.
    #[serde(default)]
    pub parameters: Value,
}

/// A tool enabled on an assistant or run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tool {
    /// Runs code in a sandbox.
    CodeInterpreter,
    /// Searches attached files.
    Retrieval,
    /// A caller-defined function.
    Function { function: FunctionDefinition },
}

/// An assistant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assistant {
    /// Assistant id.
    pub id: String,
    /// Always `assistant`.
    #[serde(default)]
    pub object: String,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub created_at: u64,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Model the assistant runs on.
    #[serde(default)]
    pub model: String,
    /// System instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Enabled tools.
    #[serde(default)]
    pub tools: Vec<Tool>,
    /// Attached file ids.
    #[serde(default)]
    pub file_ids: Vec<String>,
    /// Caller metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

/// Fields for creating or modifying an assistant.
///
/// On modify every unset field is left unchanged, including `model`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantRequest {
    /// Model to use. Required on create.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Up to 256 characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Up to 512 characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// System instructions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Enabled tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    /// Attached file ids.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_ids: Option<Vec<String>>,
    /// Caller metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl AssistantRequest {
    /// Starts a request for `model`.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Self::default()
        }
    }

    /// Sets the name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the system instructions.
    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Sets the tool list.
    #[must_use]
    pub fn tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = Some(tools);
        self
    }
}

impl Client {
    /// Creates an assistant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`](crate::Error::InvalidRequest) when
    /// `model` is unset, or any error from the request itself.
    #[instrument(skip(self, request))]
    pub async fn create_assistant(&self, request: &AssistantRequest) -> Result<Assistant> {
        if request.model.is_none() {
            return Err(crate::Error::invalid_request("assistant model is required"));
        }
        self.post_json(Operation::CreateAssistant, &[], request)
            .await
    }

    /// Lists assistants.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn list_assistants(&self, params: &ListParams) -> Result<ListResponse<Assistant>> {
        self.call(Operation::ListAssistants, &[], &params.to_query())
            .await
    }

    /// Returns one assistant.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn retrieve_assistant(&self, assistant_id: &str) -> Result<Assistant> {
        self.call(Operation::RetrieveAssistant, &[assistant_id], &Query::new())
            .await
    }

    /// Modifies an assistant.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, request))]
    pub async fn modify_assistant(
        &self,
        assistant_id: &str,
        request: &AssistantRequest,
    ) -> Result<Assistant> {
        self.post_json(Operation::ModifyAssistant, &[assistant_id], request)
            .await
    }

    /// Deletes an assistant.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn delete_assistant(&self, assistant_id: &str) -> Result<DeletionStatus> {
        self.call(Operation::DeleteAssistant, &[assistant_id], &Query::new())
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn tools_are_type_tagged() {
        let tools = vec![
            Tool::CodeInterpreter,
            Tool::Function {
                function: FunctionDefinition {
                    name: "get_weather".into(),
                    description: None,
                    parameters: serde_json::json!({"type": "object"}),
                },
            },
        ];
        let json = serde_json::to_value(&tools).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"type": "code_interpreter"},
                {"type": "function", "function": {"name": "get_weather", "parameters": {"type": "object"}}}
            ])
        );
        let back: Vec<Tool> = serde_json::from_value(json).unwrap();
        assert_eq!(back, tools);
    }

    #[test]
    fn modify_request_omits_unset_fields() {
        let request = AssistantRequest {
            name: Some("Tutor".into()),
            ..AssistantRequest::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"name": "Tutor"})
        );
    }

    #[test]
    fn assistant_decodes() {
        let assistant: Assistant = serde_json::from_str(
            r#"{"id":"asst_1","object":"assistant","created_at":1698984975,"name":"Math Tutor",
                "description":null,"model":"gpt-4","instructions":"You are a tutor.",
                "tools":[{"type":"retrieval"}],"file_ids":[],"metadata":{}}"#,
        )
        .unwrap();
        assert_eq!(assistant.tools, [Tool::Retrieval]);
        assert_eq!(assistant.name.as_deref(), Some("Math Tutor"));
    }
}
