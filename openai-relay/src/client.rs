//! The API client.
//!
//! [`Client`] wires an [`EndpointProvider`], an [`Authorizer`] and a
//! [`Transport`] together. The per-resource methods live in [`crate::api`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::{Authorizer, BearerAuth};
use crate::config::ClientConfig;
use crate::endpoint::{DirectEndpoints, EndpointProvider, ProxyEndpoints};
use crate::error::{ApiErrorEnvelope, Error, Result};
use crate::multipart::MultipartForm;
use crate::operation::Operation;
use crate::request::{Query, RequestBody, RequestBuilder};
use crate::stream::EventStream;
use crate::transport::Transport;

/// OpenAI API client.
///
/// Cheap to clone; clones share configuration and connection pool.
#[derive(Clone)]
pub struct Client {
    requests: RequestBuilder,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("requests", &self.requests)
            .field("transport", &self.transport)
            .finish()
    }
}

impl Client {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the API key is empty or the HTTP
    /// client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Create a client from environment variables.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`] and [`Client::new`].
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Starts a builder for replacing endpoints, auth or transport.
    #[must_use]
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.requests.base_url()
    }

    /// The request builder used by this client.
    #[must_use]
    pub const fn requests(&self) -> &RequestBuilder {
        &self.requests
    }

    /// Builds and executes one request, returning the raw body.
    pub(crate) async fn send_raw(
        &self,
        operation: Operation,
        segments: &[&str],
        body: RequestBody,
        query: &Query,
    ) -> Result<Bytes> {
        let spec = self.requests.build(operation, segments, body, query)?;
        self.transport.execute(spec).await
    }

    /// Builds, executes and decodes one request.
    pub(crate) async fn send<R: DeserializeOwned>(
        &self,
        operation: Operation,
        segments: &[&str],
        body: RequestBody,
        query: &Query,
    ) -> Result<R> {
        let bytes = self.send_raw(operation, segments, body, query).await?;
        Self::decode(operation, &bytes)
    }

    pub(crate) async fn post_json<B, R>(
        &self,
        operation: Operation,
        segments: &[&str],
        body: &B,
    ) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        self.send(operation, segments, RequestBody::json(body)?, &Query::new())
            .await
    }

    /// A body-less request, typically GET or DELETE.
    pub(crate) async fn call<R: DeserializeOwned>(
        &self,
        operation: Operation,
        segments: &[&str],
        query: &Query,
    ) -> Result<R> {
        self.send(operation, segments, RequestBody::Empty, query).await
    }

    pub(crate) async fn post_multipart<R: DeserializeOwned>(
        &self,
        operation: Operation,
        form: MultipartForm,
    ) -> Result<R> {
        self.send(operation, &[], RequestBody::Multipart(form), &Query::new())
            .await
    }

    /// Opens a server-sent event stream for `operation`.
    pub(crate) async fn open_event_stream<B, T>(
        &self,
        operation: Operation,
        body: &B,
    ) -> Result<EventStream<T>>
    where
        B: Serialize + ?Sized + Sync,
    {
        let spec = self
            .requests
            .build(operation, &[], RequestBody::json(body)?, &Query::new())?
            .accept_event_stream();
        let bytes = self.transport.open_stream(spec).await?;
        Ok(EventStream::new(bytes))
    }

    /// Decodes a successful response body.
    pub(crate) fn decode<R: DeserializeOwned>(operation: Operation, body: &[u8]) -> Result<R> {
        serde_json::from_slice(body).map_err(|e| {
            debug!(%operation, "Failed to decode response: {e}");
            Error::decode(
                format!("valid {operation} response"),
                format!("parse error: {e}, response: {}", String::from_utf8_lossy(body)),
            )
        })
    }

    /// Some deployments report errors inside a `200 OK` body.
    pub(crate) fn reject_embedded_error(body: &[u8]) -> Result<()> {
        match ApiErrorEnvelope::parse(body) {
            Some(error) => Err(Error::Api {
                status: None,
                error,
            }),
            None => Ok(()),
        }
    }
}

/// Builder for a [`Client`] with custom parts.
pub struct ClientBuilder {
    config: ClientConfig,
    endpoints: Option<Arc<dyn EndpointProvider>>,
    authorizer: Option<Arc<dyn Authorizer>>,
    transport: Option<Arc<dyn Transport>>,
    user_agent: Option<String>,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("config", &self.config)
            .field("endpoints", &self.endpoints)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl ClientBuilder {
    fn new(config: ClientConfig) -> Self {
        Self {
            config,
            endpoints: None,
            authorizer: None,
            transport: None,
            user_agent: None,
        }
    }

    /// Replaces the endpoint table.
    #[must_use]
    pub fn endpoints(mut self, endpoints: impl EndpointProvider + 'static) -> Self {
        self.endpoints = Some(Arc::new(endpoints));
        self
    }

    /// Routes every operation through caller-supplied path and method functions.
    #[must_use]
    pub fn proxy<P, M>(self, path: P, method: M) -> Self
    where
        P: Fn(Operation) -> String + Send + Sync + 'static,
        M: Fn(Operation) -> Method + Send + Sync + 'static,
    {
        self.endpoints(ProxyEndpoints::new(path, method))
    }

    /// Replaces bearer authentication.
    ///
    /// With a custom authorizer the configured API key is not required.
    #[must_use]
    pub fn authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.authorizer = Some(Arc::new(authorizer));
        self
    }

    /// Replaces the HTTP transport.
    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Overrides the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if no authorizer was given and the API
    /// key is empty, or if the HTTP client cannot be created.
    pub fn build(self) -> Result<Client> {
        let config = self.config;

        let authorizer = match self.authorizer {
            Some(authorizer) => authorizer,
            None => {
                if config.api_key.is_empty() {
                    return Err(Error::invalid_request("API key is required"));
                }
                let mut auth = BearerAuth::new(config.api_key.clone());
                if let Some(org) = &config.organization {
                    auth = auth.with_organization(org.clone());
                }
                Arc::new(auth)
            }
        };

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = config.timeout_secs {
                    builder = builder.timeout(Duration::from_secs(timeout));
                }
                let client = builder
                    .build()
                    .map_err(|e| Error::invalid_request(format!("Failed to create HTTP client: {e}")))?;
                Arc::new(client)
            }
        };

        let endpoints = self
            .endpoints
            .unwrap_or_else(|| Arc::new(DirectEndpoints));

        let mut requests = RequestBuilder::new(config.base_url, endpoints, authorizer);
        if let Some(agent) = &self.user_agent {
            requests = requests.with_user_agent(agent)?;
        }

        Ok(Client {
            requests,
            transport,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_rejected() {
        let err = Client::new(ClientConfig::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(ref m) if m.contains("API key")));
    }

    #[test]
    fn custom_authorizer_needs_no_key() {
        let client = Client::builder(ClientConfig::default())
            .authorizer(|_: &mut http::HeaderMap| Ok::<_, Error>(()))
            .build()
            .unwrap();
        assert_eq!(client.base_url(), ClientConfig::DEFAULT_BASE_URL);
    }

    #[test]
    fn proxy_routes_requests() {
        let client = Client::builder(ClientConfig::new("k").with_base_url("https://relay.local"))
            .proxy(|op| format!("/api/{op}"), |_| Method::POST)
            .build()
            .unwrap();
        let spec = client
            .requests()
            .build(Operation::ListModels, &[], RequestBody::Empty, &Query::new())
            .unwrap();
        assert_eq!(spec.method, Method::POST);
        assert_eq!(spec.url.as_str(), "https://relay.local/api/list-models");
    }

    #[test]
    fn organization_header_is_sent() {
        let client = Client::new(ClientConfig::new("k").with_organization("org-9")).unwrap();
        let spec = client
            .requests()
            .build(Operation::ListModels, &[], RequestBody::Empty, &Query::new())
            .unwrap();
        assert_eq!(spec.headers[crate::auth::ORGANIZATION_HEADER], "org-9");
    }

    #[test]
    fn embedded_error_is_detected() {
        let body = br#"{"error":{"message":"The server is overloaded","type":"server_error"}}"#;
        let err = Client::reject_embedded_error(body).unwrap_err();
        assert!(matches!(err, Error::Api { status: None, ref error } if error.message.contains("overloaded")));

        assert!(Client::reject_embedded_error(br#"{"id":"chatcmpl-1","choices":[]}"#).is_ok());
    }

    #[test]
    fn decode_failure_is_decode_error() {
        let err = Client::decode::<crate::Envelope<u32>>(Operation::CreateCompletion, b"[1,2]")
            .unwrap_err();
        assert!(matches!(err, Error::Decode { ref expected, .. } if expected.contains("create-completion")));
    }
}
