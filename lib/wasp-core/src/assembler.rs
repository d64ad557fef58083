use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use tracing::{debug, trace, warn};

use crate::arguments::Arguments;
use crate::error::WaspError;
use crate::interceptor::{AUTHORIZATION, RequestInterceptor};
use crate::metadata::{EndpointMetadata, ParameterRole};
use crate::parser::Parser;
use crate::request::RequestDescriptor;
use crate::retry::RetryPolicy;

/// Regular expression for matching path parameters in the format `{param_name}`.
static RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?<name>\w+)}").expect("a valid regex"));

/// Characters left untouched by URL encoding: the RFC 3986 unreserved set.
const URL_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// String form of an argument: strings verbatim, any other value as JSON text.
fn string_form(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Builds [`RequestDescriptor`]s from endpoint metadata and call arguments.
///
/// The assembly order is fixed:
/// 1. arguments are bound to their roles, in declaration order
/// 2. static headers are added, unless a header argument already set them
/// 3. the endpoint retry policy is applied
/// 4. interceptor query params and headers are added, interceptor headers overwrite
/// 5. the interceptor retry policy is applied if none is set yet
/// 6. the interceptor auth token is added as the `Authorization` header
///
/// Path and query values are used in their string form, as is. Use
/// [`with_url_encoding`](Self::with_url_encoding) to percent-encode them.
/// Header names are compared ignoring ASCII case.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use wasp_core::{Arguments, EndpointDeclaration, EndpointMetadata, JsonParser, RequestAssembler};
/// # #[derive(Debug)] struct Repo;
///
/// # fn main() -> Result<(), wasp_core::WaspError> {
/// let declaration = EndpointDeclaration::new("GitHubService", "fetchRepo")
///     .get("/repos/{user}/{repo}")
///     .path("user")
///     .path("repo")
///     .callback::<Repo>();
/// let metadata = Arc::new(EndpointMetadata::extract(&declaration)?);
///
/// let assembler = RequestAssembler::new("https://api.github.com", Arc::new(JsonParser));
/// let request = assembler.assemble(&metadata, &Arguments::new().arg("orhanobut").arg("wasp"))?;
///
/// assert_eq!(request.url(), "https://api.github.com/repos/orhanobut/wasp");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, derive_more::Debug)]
pub struct RequestAssembler {
    base_url: String,
    parser: Arc<dyn Parser>,
    #[debug(skip)]
    interceptor: Option<Arc<dyn RequestInterceptor>>,
    url_encoding: bool,
}

impl RequestAssembler {
    /// Creates an assembler targeting `base_url`.
    pub fn new(base_url: impl Into<String>, parser: Arc<dyn Parser>) -> Self {
        Self {
            base_url: base_url.into(),
            parser,
            interceptor: None,
            url_encoding: false,
        }
    }

    /// Attaches an interceptor consulted for every request.
    pub fn with_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    /// Percent-encodes path values, query names and query values outside the
    /// RFC 3986 unreserved set.
    pub fn with_url_encoding(mut self) -> Self {
        self.url_encoding = true;
        self
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Assembles the request of one invocation.
    ///
    /// # Errors
    ///
    /// Fails with a binding error when:
    /// - the number of arguments does not match the declared parameters
    /// - an argument is absent
    /// - a body-map argument is not a mapping, or a tag argument is not a string
    ///
    /// Body serialization errors from the [`Parser`] are propagated.
    pub fn assemble(
        &self,
        metadata: &Arc<EndpointMetadata>,
        arguments: &Arguments,
    ) -> Result<RequestDescriptor, WaspError> {
        let expected = metadata.argument_count();
        if arguments.len() != expected {
            return Err(WaspError::ArgumentCountMismatch {
                operation: metadata.operation().to_string(),
                expected,
                actual: arguments.len(),
            });
        }

        let mut pending = PendingRequest::new(metadata, self.url_encoding);
        for (index, (role, value)) in metadata
            .parameter_roles()
            .iter()
            .zip(arguments.values())
            .enumerate()
        {
            pending.bind(index, role.as_ref(), value, self.parser.as_ref())?;
        }

        pending.add_static_headers();
        if let Some(interceptor) = &self.interceptor {
            pending.intercept(interceptor.as_ref());
        }

        let result = pending.finish(&self.base_url);
        debug!(operation = %metadata.operation(), url = %result.url, method = %result.method, "request assembled");
        Ok(result)
    }
}

/// Per-call working state of the assembly.
struct PendingRequest<'a> {
    metadata: &'a Arc<EndpointMetadata>,
    url_encoding: bool,
    relative_url: String,
    query: String,
    headers: IndexMap<String, String>,
    body: Option<String>,
    tag: Option<String>,
    retry_policy: Option<RetryPolicy>,
}

impl<'a> PendingRequest<'a> {
    fn new(metadata: &'a Arc<EndpointMetadata>, url_encoding: bool) -> Self {
        Self {
            metadata,
            url_encoding,
            relative_url: metadata.relative_url_template().to_string(),
            query: String::new(),
            headers: IndexMap::new(),
            body: None,
            tag: None,
            retry_policy: None,
        }
    }

    fn bind(
        &mut self,
        index: usize,
        role: Option<&ParameterRole>,
        value: &serde_json::Value,
        parser: &dyn Parser,
    ) -> Result<(), WaspError> {
        if value.is_null() {
            return Err(WaspError::MissingArgument {
                operation: self.metadata.operation().to_string(),
                index,
                role: role.map_or_else(|| "unbound".to_string(), ToString::to_string),
            });
        }
        let Some(role) = role else {
            return Ok(());
        };
        trace!(index, %role, %value, "binding argument");

        match role {
            ParameterRole::Path(name) => {
                let value = self.url_component(&string_form(value));
                let placeholder = ["{", name, "}"].concat();
                if !self.relative_url.contains(&placeholder) {
                    warn!(?name, template = %self.metadata.relative_url_template(), "path placeholder not found");
                }
                self.relative_url = self.relative_url.replacen(&placeholder, &value, 1);
            }
            ParameterRole::Query(name) => {
                self.append_query(name, &string_form(value));
            }
            ParameterRole::Header(name) => {
                self.set_header(name, string_form(value));
            }
            ParameterRole::Body => {
                self.set_body(parser.to_json(value)?)?;
            }
            ParameterRole::BodyMap => {
                if !value.is_object() {
                    return Err(self.unsupported(role, "key/value mappings", value));
                }
                self.set_body(parser.to_json(value)?)?;
            }
            ParameterRole::Tag => {
                let Some(tag) = value.as_str() else {
                    return Err(self.unsupported(role, "strings", value));
                };
                self.tag = Some(tag.to_string());
            }
        }
        Ok(())
    }

    fn add_static_headers(&mut self) {
        for (key, value) in self.metadata.static_headers() {
            if self.header_index(key).is_none() {
                self.headers.insert(key.clone(), value.clone());
            }
        }
        if self.retry_policy.is_none() {
            self.retry_policy = self.metadata.retry_policy().copied();
        }
    }

    fn intercept(&mut self, interceptor: &dyn RequestInterceptor) {
        let mut query_params = IndexMap::new();
        interceptor.on_query_params_added(&mut query_params);
        for (name, value) in &query_params {
            self.append_query(name, &string_form(value));
        }

        let mut headers = IndexMap::new();
        interceptor.on_headers_added(&mut headers);
        for (name, value) in headers {
            self.set_header(&name, value);
        }

        if self.retry_policy.is_none() {
            self.retry_policy = interceptor.retry_policy();
        }

        if let Some(auth_token) = interceptor.auth_token() {
            if !auth_token.is_filter_enabled() || self.metadata.auth_enabled() {
                self.set_header(AUTHORIZATION, auth_token.token().as_str().to_string());
            } else {
                trace!(operation = %self.metadata.operation(), "auth token filtered out");
            }
        }
    }

    fn finish(self, base_url: &str) -> RequestDescriptor {
        let Self {
            metadata,
            url_encoding: _,
            relative_url,
            query,
            headers,
            body,
            tag,
            retry_policy,
        } = self;

        let unresolved: Vec<_> = RE
            .captures_iter(&relative_url)
            .filter_map(|caps| caps.name("name"))
            .map(|name| name.as_str().to_string())
            .collect();
        if !unresolved.is_empty() {
            warn!(?unresolved, path = %relative_url, "path has unresolved placeholders");
        }

        let base_url = metadata.base_url().unwrap_or(base_url);
        RequestDescriptor {
            url: format!("{base_url}{relative_url}{query}"),
            method: metadata.http_method().clone(),
            headers,
            body,
            retry_policy,
            mock: metadata.mock().cloned(),
            tag,
            metadata: Arc::clone(metadata),
        }
    }

    fn append_query(&mut self, name: &str, value: &str) {
        let name = self.url_component(name);
        let value = self.url_component(value);
        self.query.push(if self.query.is_empty() { '?' } else { '&' });
        self.query.push_str(&name);
        self.query.push('=');
        self.query.push_str(&value);
    }

    fn url_component(&self, text: &str) -> String {
        if self.url_encoding {
            utf8_percent_encode(text, URL_ENCODE_SET).to_string()
        } else {
            text.to_string()
        }
    }

    fn header_index(&self, name: &str) -> Option<usize> {
        self.headers
            .keys()
            .position(|key| key.eq_ignore_ascii_case(name))
    }

    /// Sets a header, the spelling and position of the first write are kept.
    fn set_header(&mut self, name: &str, value: String) {
        match self.header_index(name) {
            Some(index) => {
                if let Some((_, slot)) = self.headers.get_index_mut(index) {
                    *slot = value;
                }
            }
            None => {
                self.headers.insert(name.to_string(), value);
            }
        }
    }

    fn set_body(&mut self, body: String) -> Result<(), WaspError> {
        if self.body.is_some() {
            return Err(WaspError::MultipleBodies {
                operation: self.metadata.operation().to_string(),
            });
        }
        self.body = Some(body);
        Ok(())
    }

    fn unsupported(
        &self,
        role: &ParameterRole,
        expected: &'static str,
        value: &serde_json::Value,
    ) -> WaspError {
        WaspError::UnsupportedArgument {
            operation: self.metadata.operation().to_string(),
            role: role.to_string(),
            expected,
            value: value.clone(),
        }
    }
}
