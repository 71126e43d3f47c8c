//! The network seam.
//!
//! [`Transport`] executes one [`RequestSpec`] and classifies the outcome. The
//! default implementation is [`reqwest::Client`]; tests and embedders can plug
//! in their own.

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::debug;

use crate::error::{Error, Result};
use crate::request::RequestSpec;

/// Raw response body chunks of a streaming request.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Executes built requests.
///
/// One network call per invocation, no retries. A status outside `200..=299`
/// is reported through [`Error::from_status`].
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends the request and buffers the whole response body.
    ///
    /// # Errors
    ///
    /// [`Error::Network`] when no response arrives, [`Error::Api`] or
    /// [`Error::HttpStatus`] for non-2xx responses.
    async fn execute(&self, request: RequestSpec) -> Result<Bytes>;

    /// Sends the request and returns the body as it arrives.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute), for the response head.
    async fn open_stream(&self, request: RequestSpec) -> Result<ByteStream>;
}

fn to_reqwest(client: &reqwest::Client, spec: RequestSpec) -> reqwest::RequestBuilder {
    let builder = client
        .request(spec.method, spec.url)
        .headers(spec.headers);
    if spec.body.is_empty() {
        builder
    } else {
        builder.body(spec.body)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await.unwrap_or_default();
    debug!(status = status.as_u16(), body_len = body.len(), "Error response");
    Err(Error::from_status(status.as_u16(), &body))
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn execute(&self, request: RequestSpec) -> Result<Bytes> {
        let operation = request.operation;
        let response = to_reqwest(self, request).send().await?;
        let response = check_status(response).await?;
        let body = response.bytes().await?;

        debug!(%operation, body_len = body.len(), "Response received");
        Ok(body)
    }

    async fn open_stream(&self, request: RequestSpec) -> Result<ByteStream> {
        let operation = request.operation;
        let response = to_reqwest(self, request).send().await?;
        let response = check_status(response).await?;

        debug!(%operation, "Stream opened");
        Ok(Box::pin(response.bytes_stream().map(|chunk| chunk.map_err(Error::from))))
    }
}
