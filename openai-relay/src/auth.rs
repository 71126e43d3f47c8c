//! Pluggable request authorization.

use std::fmt;

use http::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};

use crate::error::{Error, Result};

/// Header carrying the organization id.
pub const ORGANIZATION_HEADER: HeaderName = HeaderName::from_static("openai-organization");

/// Stamps credentials onto an outgoing request.
///
/// Called once per request, after the base headers are set. Implementations
/// must be idempotent and may only touch headers.
pub trait Authorizer: Send + Sync {
    /// Adds credentials to `headers`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] when the credentials cannot be encoded
    /// as header values.
    fn authorize(&self, headers: &mut HeaderMap) -> Result<()>;
}

impl<F> Authorizer for F
where
    F: Fn(&mut HeaderMap) -> Result<()> + Send + Sync,
{
    fn authorize(&self, headers: &mut HeaderMap) -> Result<()> {
        self(headers)
    }
}

/// Creates an Authorization header with Bearer token.
///
/// # Errors
///
/// Fails when the key contains bytes that are not valid in a header.
pub fn make_auth_header(key: impl AsRef<str>) -> Result<(HeaderName, HeaderValue)> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", key.as_ref()))
        .map_err(|e| Error::invalid_request(format!("Invalid API key: {e}")))?;
    value.set_sensitive(true);
    Ok((AUTHORIZATION, value))
}

/// Inserts a Bearer auth header into the given header map.
///
/// # Errors
///
/// See [`make_auth_header`].
pub fn bearer_auth_header(headers: &mut HeaderMap, key: impl AsRef<str>) -> Result<()> {
    let (k, v) = make_auth_header(key)?;
    headers.insert(k, v);
    Ok(())
}

/// Default strategy: `Authorization: Bearer <key>` plus an optional
/// organization header.
#[derive(Clone)]
pub struct BearerAuth {
    api_key: String,
    organization: Option<String>,
}

impl BearerAuth {
    /// Creates a bearer authorizer for the given key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            organization: None,
        }
    }

    /// Also sends the organization header.
    #[must_use]
    pub fn with_organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }
}

impl fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth")
            .field("api_key", &"<redacted>")
            .field("organization", &self.organization)
            .finish()
    }
}

impl Authorizer for BearerAuth {
    fn authorize(&self, headers: &mut HeaderMap) -> Result<()> {
        bearer_auth_header(headers, &self.api_key)?;
        if let Some(org) = &self.organization {
            let value = HeaderValue::from_str(org)
                .map_err(|e| Error::invalid_request(format!("Invalid organization: {e}")))?;
            headers.insert(ORGANIZATION_HEADER, value);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn bearer_sets_authorization() {
        let mut headers = HeaderMap::new();
        BearerAuth::new("sk-test").authorize(&mut headers).unwrap();

        assert_eq!(headers[AUTHORIZATION], "Bearer sk-test");
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert!(!headers.contains_key(ORGANIZATION_HEADER));
    }

    #[test]
    fn bearer_is_idempotent() {
        let auth = BearerAuth::new("sk-test").with_organization("org-1");
        let mut headers = HeaderMap::new();
        auth.authorize(&mut headers).unwrap();
        auth.authorize(&mut headers).unwrap();

        assert_eq!(headers.get_all(AUTHORIZATION).iter().count(), 1);
        assert_eq!(headers[ORGANIZATION_HEADER], "org-1");
    }

    #[test]
    fn invalid_key_is_rejected() {
        let mut headers = HeaderMap::new();
        let err = BearerAuth::new("bad\nkey").authorize(&mut headers).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn closures_are_authorizers() {
        let auth = |headers: &mut HeaderMap| {
            headers.insert("api-key", HeaderValue::from_static("azure-key"));
            Ok::<_, Error>(())
        };
        let mut headers = HeaderMap::new();
        auth.authorize(&mut headers).unwrap();

        assert_eq!(headers["api-key"], "azure-key");
        assert!(!headers.contains_key(AUTHORIZATION));
    }

    #[test]
    fn debug_hides_key() {
        let rendered = format!("{:?}", BearerAuth::new("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
    }
}
