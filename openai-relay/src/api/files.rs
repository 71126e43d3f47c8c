//! Uploaded files.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{DeletionStatus, ListResponse};
use crate::client::Client;
use crate::error::Result;
use crate::multipart::MultipartForm;
use crate::operation::Operation;
use crate::request::{Query, RequestBody};

/// What an uploaded file is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilePurpose {
    /// Training data.
    FineTune,
    /// Fine-tuning output.
    FineTuneResults,
    /// Assistant attachments.
    Assistants,
    /// Files produced by assistants.
    AssistantsOutput,
}

impl FilePurpose {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FineTune => "fine-tune",
            Self::FineTuneResults => "fine-tune-results",
            Self::Assistants => "assistants",
            Self::AssistantsOutput => "assistants-output",
        }
    }
}

/// A stored file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObject {
    /// File id.
    pub id: String,
    /// Always `file`.
    #[serde(default)]
    pub object: String,
    /// Size in bytes.
    #[serde(default)]
    pub bytes: u64,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub created_at: u64,
    /// Original filename.
    #[serde(default)]
    pub filename: String,
    /// Kept as a string so purposes added later still decode.
    #[serde(default)]
    pub purpose: String,
}

/// A file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Name sent in the upload.
    pub filename: String,
    /// File contents.
    pub data: Bytes,
    /// Intended use.
    pub purpose: FilePurpose,
}

impl FileUpload {
    /// Creates an upload.
    #[must_use]
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>, purpose: FilePurpose) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
            purpose,
        }
    }

    fn to_form(&self) -> MultipartForm {
        MultipartForm::new()
            .file("file", self.filename.as_str(), self.data.clone())
            .text("purpose", self.purpose.as_str())
    }
}

impl Client {
    /// Lists files, optionally only those with `purpose`.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn list_files(
        &self,
        purpose: Option<FilePurpose>,
    ) -> Result<ListResponse<FileObject>> {
        let query = Query::new().push_opt("purpose", purpose.map(FilePurpose::as_str));
        self.call(Operation::ListFiles, &[], &query).await
    }

    /// Uploads a file.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, upload), fields(file = %upload.filename, bytes = upload.data.len()))]
    pub async fn upload_file(&self, upload: &FileUpload) -> Result<FileObject> {
        self.post_multipart(Operation::UploadFile, upload.to_form())
            .await
    }

    /// Returns information about a file.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn retrieve_file(&self, file_id: &str) -> Result<FileObject> {
        self.call(Operation::RetrieveFile, &[file_id], &Query::new())
            .await
    }

    /// Downloads the contents of a file.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction or transport.
    #[instrument(skip(self))]
    pub async fn retrieve_file_content(&self, file_id: &str) -> Result<Bytes> {
        let content = self
            .send_raw(
                Operation::RetrieveFileContent,
                &[file_id, "content"],
                RequestBody::Empty,
                &Query::new(),
            )
            .await?;
        debug!(bytes = content.len(), "File content received");
        Ok(content)
    }

    /// Deletes a file.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self))]
    pub async fn delete_file(&self, file_id: &str) -> Result<DeletionStatus> {
        self.call(Operation::DeleteFile, &[file_id], &Query::new())
            .await
    }
}
