use std::fmt;
use std::sync::Arc;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use indexmap::IndexMap;

use crate::error::WaspError;
use crate::metadata::EndpointMetadata;
use crate::retry::RetryPolicy;

/// Mock response indirection declared on an endpoint.
///
/// The descriptor is carried to the transport without interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MockDescriptor {
    status_code: u16,
    path: Option<String>,
}

impl MockDescriptor {
    /// Creates a mock answering with `status_code` and a generated body.
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            path: None,
        }
    }

    /// Sets the path of the asset holding the mock body.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// The status code of the mocked response.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// The asset path of the mocked body, if any.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

impl Default for MockDescriptor {
    fn default() -> Self {
        Self::new(200)
    }
}

/// A fully resolved request, ready for the transport.
///
/// Built once per invocation by the [`RequestAssembler`](crate::RequestAssembler)
/// and never mutated afterwards.
#[derive(derive_more::Debug, Clone)]
pub struct RequestDescriptor {
    pub(crate) url: String,
    pub(crate) method: Method,
    pub(crate) headers: IndexMap<String, String>,
    pub(crate) body: Option<String>,
    pub(crate) retry_policy: Option<RetryPolicy>,
    pub(crate) mock: Option<MockDescriptor>,
    pub(crate) tag: Option<String>,
    #[debug(skip)]
    pub(crate) metadata: Arc<EndpointMetadata>,
}

impl RequestDescriptor {
    /// The full URL: base, resolved path and query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The headers, in insertion order.
    ///
    /// Names are unique ignoring ASCII case, each keeps the spelling of its first write.
    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    /// Looks up a header by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The serialized body, if any.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// The retry policy, if any.
    pub fn retry_policy(&self) -> Option<&RetryPolicy> {
        self.retry_policy.as_ref()
    }

    /// The mock indirection, if any.
    pub fn mock(&self) -> Option<&MockDescriptor> {
        self.mock.as_ref()
    }

    /// The correlation tag, if any.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// The metadata this request was assembled from.
    pub fn metadata(&self) -> &EndpointMetadata {
        &self.metadata
    }

    /// Converts the headers to an [`HeaderMap`] for the transport.
    ///
    /// # Errors
    ///
    /// Fails if a header name or value contains invalid characters.
    pub fn header_map(&self) -> Result<HeaderMap, WaspError> {
        let mut result = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())?;
            let value = HeaderValue::from_str(value)?;
            result.insert(name, value);
        }
        Ok(result)
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Request URL : {}", self.url)?;
        if let Some(body) = &self.body {
            write!(f, ", Body: {body}")?;
        }
        Ok(())
    }
}
