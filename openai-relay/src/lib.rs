//! openai-relay - An async client core for OpenAI-style HTTP APIs
//!
//! Every call is a logical [`Operation`] resolved to a method and path by an
//! [`EndpointProvider`], turned into a [`RequestSpec`] by the
//! [`RequestBuilder`](request::RequestBuilder), authorized by an
//! [`Authorizer`] and executed by a [`Transport`]. Streaming chat responses
//! are decoded from server-sent events by [`EventStream`] and
//! [`StreamDecoder`].
//!
//! Endpoints can be routed through a proxy with [`ProxyEndpoints`], and both
//! authentication and transport are replaceable through [`ClientBuilder`].

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod conversation;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod multipart;
pub mod operation;
pub mod prelude;
pub mod request;
pub mod stream;
pub mod transport;

pub use auth::{Authorizer, BearerAuth};
pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use conversation::ConversationHistory;
pub use endpoint::{DirectEndpoints, EndpointProvider, ProxyEndpoints};
pub use envelope::{Envelope, Usage};
pub use error::{ApiError, Error, Result};
pub use multipart::MultipartForm;
pub use operation::Operation;
pub use request::{Query, RequestBody, RequestSpec};
pub use stream::{DecoderState, EventStream, StreamDecoder};
pub use transport::{ByteStream, Transport};
