//! Request construction.
//!
//! [`RequestBuilder`] turns an [`Operation`] plus its inputs into a
//! [`RequestSpec`]: method, absolute URL, headers and encoded body. Nothing
//! here performs I/O.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use http::Method;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::auth::Authorizer;
use crate::endpoint::EndpointProvider;
use crate::error::{Error, Result};
use crate::multipart::MultipartForm;
use crate::operation::Operation;

const DEFAULT_USER_AGENT: &str = concat!("openai-relay/", env!("CARGO_PKG_VERSION"));

/// Body of an outgoing request.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No body and no `Content-Type`.
    #[default]
    Empty,
    /// Pre-serialized JSON.
    Json(Bytes),
    /// A multipart form, encoded at build time.
    Multipart(MultipartForm),
}

impl RequestBody {
    /// Serializes `value` as a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if serialization fails.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_vec(value)
            .map(|v| Self::Json(Bytes::from(v)))
            .map_err(|e| Error::invalid_request(format!("Failed to serialize body: {e}")))
    }
}

/// URL query parameters, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(Vec<(String, String)>);

impl Query {
    /// Creates an empty query.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a pair.
    #[must_use]
    pub fn push(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.0.push((key.into(), value.to_string()));
        self
    }

    /// Appends a pair when `value` is present.
    #[must_use]
    pub fn push_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.push(key, v),
            None => self,
        }
    }

    /// Whether no pairs were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A fully built request, ready for a [`Transport`](crate::transport::Transport).
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// The operation this request performs.
    pub operation: Operation,
    /// HTTP method.
    pub method: Method,
    /// Absolute URL including query.
    pub url: Url,
    /// Request headers, credentials included.
    pub headers: HeaderMap,
    /// Encoded body; empty for [`RequestBody::Empty`].
    pub body: Bytes,
}

impl RequestSpec {
    /// Marks the request as expecting a server-sent event stream.
    #[must_use]
    pub fn accept_event_stream(mut self) -> Self {
        self.headers
            .insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        self
    }
}

/// Builds [`RequestSpec`]s against a base URL.
#[derive(Clone)]
pub struct RequestBuilder {
    base_url: String,
    endpoints: Arc<dyn EndpointProvider>,
    authorizer: Arc<dyn Authorizer>,
    user_agent: HeaderValue,
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("base_url", &self.base_url)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl RequestBuilder {
    /// Creates a builder.
    ///
    /// The base URL is validated lazily, on each [`build`](Self::build).
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        endpoints: Arc<dyn EndpointProvider>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            endpoints,
            authorizer,
            user_agent: HeaderValue::from_static(DEFAULT_USER_AGENT),
        }
    }

    /// Overrides the `User-Agent` header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if `agent` is not a valid header value.
    pub fn with_user_agent(mut self, agent: &str) -> Result<Self> {
        self.user_agent = HeaderValue::from_str(agent)
            .map_err(|e| Error::invalid_request(format!("Invalid user agent: {e}")))?;
        Ok(self)
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds a request.
    ///
    /// `segments` are appended to the resolved path, each percent-encoded as a
    /// single path segment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the base URL is malformed, the
    /// resolved path is empty, or the authorizer fails.
    pub fn build(
        &self,
        operation: Operation,
        segments: &[&str],
        body: RequestBody,
        query: &Query,
    ) -> Result<RequestSpec> {
        let (method, path) = self.endpoints.resolve(operation);
        if path.trim().is_empty() {
            return Err(Error::invalid_request(format!(
                "Endpoint provider returned an empty path for {operation}"
            )));
        }

        let url = self.url(&path, segments, query)?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, self.user_agent.clone());
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let body = match body {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Json(bytes) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                bytes
            }
            RequestBody::Multipart(form) => {
                let content_type = HeaderValue::from_str(&form.content_type())
                    .map_err(|e| Error::invalid_request(format!("Invalid boundary: {e}")))?;
                headers.insert(CONTENT_TYPE, content_type);
                form.encode()
            }
        };

        self.authorizer.authorize(&mut headers)?;

        debug!(
            operation = %operation,
            method = %method,
            url = %url,
            body_len = body.len(),
            "Built request"
        );

        Ok(RequestSpec {
            operation,
            method,
            url,
            headers,
            body,
        })
    }

    fn url(&self, path: &str, segments: &[&str], query: &Query) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            Error::invalid_request(format!("Invalid base URL '{}': {e}", self.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(Error::invalid_request(format!(
                "Invalid base URL '{}': expected an http(s) URL",
                self.base_url
            )));
        }

        // Proxies may route by query string.
        let (path, path_query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };

        let prefix = url.path().trim_end_matches('/').to_owned();
        let path = path.trim_start_matches('/');
        url.set_path(&format!("{prefix}/{path}"));
        url.set_query(path_query);

        if !segments.is_empty() {
            let mut parts = url
                .path_segments_mut()
                .map_err(|()| Error::invalid_request("Base URL cannot take path segments"))?;
            parts.pop_if_empty();
            for segment in segments {
                parts.push(segment);
            }
        }

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }

        Ok(url)
    }
}
