use std::fmt;

use http::Method;
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::declaration::{
    EndpointDeclaration, MethodMarker, OperationId, ParamKind, ParamMarker, TypeDescriptor,
};
use crate::error::WaspError;
use crate::request::MockDescriptor;
use crate::retry::RetryPolicy;

/// Declarative purpose of one parameter.
///
/// The role is a label; the value is the argument supplied at call time at the same position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterRole {
    /// Substitutes `{name}` in the path template.
    Path(String),
    /// Appended to the query string.
    Query(String),
    /// Sent as a request header.
    Header(String),
    /// Serialized as the request body.
    Body,
    /// A key/value mapping serialized as the request body.
    BodyMap,
    /// Correlation tag of the request.
    Tag,
}

impl ParameterRole {
    /// Returns `true` for [`ParameterRole::Body`] and [`ParameterRole::BodyMap`].
    pub fn is_body(&self) -> bool {
        matches!(self, Self::Body | Self::BodyMap)
    }
}

impl fmt::Display for ParameterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(name) => write!(f, "path({name})"),
            Self::Query(name) => write!(f, "query({name})"),
            Self::Header(name) => write!(f, "header({name})"),
            Self::Body => write!(f, "body"),
            Self::BodyMap => write!(f, "bodyMap"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

impl From<&ParamMarker> for ParameterRole {
    fn from(value: &ParamMarker) -> Self {
        match value {
            ParamMarker::Path(name) => Self::Path(name.clone()),
            ParamMarker::Query(name) => Self::Query(name.clone()),
            ParamMarker::Header(name) => Self::Header(name.clone()),
            ParamMarker::Body => Self::Body,
            ParamMarker::BodyMap => Self::BodyMap,
            ParamMarker::Tag => Self::Tag,
        }
    }
}

/// Validated, immutable description of one endpoint operation.
///
/// Produced once by [`EndpointMetadata::extract`] and reused for every call.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointMetadata {
    declaration: EndpointDeclaration,
    operation: OperationId,
    relative_url_template: String,
    http_method: Method,
    response_element_type: TypeDescriptor,
    parameter_roles: Vec<Option<ParameterRole>>,
    static_headers: IndexMap<String, String>,
    auth_enabled: bool,
    base_url: Option<String>,
    retry_policy: Option<RetryPolicy>,
    mock: Option<MockDescriptor>,
}

// Extraction
impl EndpointMetadata {
    /// Extracts and validates the metadata of a declared operation.
    ///
    /// When several HTTP verb markers are declared, the last one wins.
    ///
    /// # Errors
    ///
    /// Fails with a declaration error when:
    /// - no HTTP verb marker is declared, or the verb is not a valid method
    /// - a static header does not follow the `key:value` format
    /// - there is no parameter, or the trailing parameter is not a callback
    /// - two path, query or header parameters share a name
    /// - more than one parameter carries the body
    pub fn extract(declaration: &EndpointDeclaration) -> Result<Self, WaspError> {
        let operation = declaration.id();

        let mut http = None;
        let mut static_headers = IndexMap::new();
        let mut auth_enabled = false;
        let mut base_url = None;
        let mut retry_policy = None;
        let mut mock = None;

        for marker in declaration.markers() {
            match marker {
                MethodMarker::Http { method, path } => http = Some((method, path)),
                MethodMarker::Headers(entries) => {
                    for entry in entries {
                        let (key, value) = split_header(&operation, entry)?;
                        static_headers.insert(key, value);
                    }
                }
                MethodMarker::Auth => auth_enabled = true,
                MethodMarker::EndPoint(url) => base_url = Some(url.clone()),
                MethodMarker::RetryPolicy(policy) => retry_policy = Some(*policy),
                MethodMarker::Mock(descriptor) => mock = Some(descriptor.clone()),
            }
        }

        let Some((method, path)) = http else {
            return Err(WaspError::MissingHttpMethod {
                operation: operation.to_string(),
            });
        };
        let http_method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;

        let response_element_type = response_element_type(declaration)?;
        let parameter_roles = parameter_roles(declaration)?;

        debug!(%operation, %http_method, %path, "endpoint metadata extracted");
        Ok(Self {
            declaration: declaration.clone(),
            operation,
            relative_url_template: path.clone(),
            http_method,
            response_element_type,
            parameter_roles,
            static_headers,
            auth_enabled,
            base_url,
            retry_policy,
            mock,
        })
    }
}

fn split_header(operation: &OperationId, entry: &str) -> Result<(String, String), WaspError> {
    let malformed = || WaspError::MalformedHeader {
        operation: operation.to_string(),
        entry: entry.to_string(),
    };

    let parts: Vec<_> = entry.split(':').map(str::trim).collect();
    let [key, value] = parts.as_slice() else {
        return Err(malformed());
    };
    if key.is_empty() || value.is_empty() {
        return Err(malformed());
    }
    Ok(((*key).to_string(), (*value).to_string()))
}

fn response_element_type(declaration: &EndpointDeclaration) -> Result<TypeDescriptor, WaspError> {
    let Some(last) = declaration.params().last() else {
        return Err(WaspError::MissingCallback {
            operation: declaration.id().to_string(),
        });
    };
    match last.kind() {
        ParamKind::Callback(element_type) => Ok(element_type),
        ParamKind::Value => Err(WaspError::InvalidCallback {
            operation: declaration.id().to_string(),
            parameter: last.name().to_string(),
        }),
    }
}

fn parameter_roles(
    declaration: &EndpointDeclaration,
) -> Result<Vec<Option<ParameterRole>>, WaspError> {
    let duplicated = |role, name: &str| WaspError::DuplicateName {
        operation: declaration.id().to_string(),
        role,
        name: name.to_string(),
    };

    let mut path_names = IndexSet::new();
    let mut query_names = IndexSet::new();
    let mut header_names = IndexSet::new();
    let mut has_body = false;

    let mut result = Vec::with_capacity(declaration.params().len());
    for param in declaration.params() {
        for marker in param.markers() {
            match marker {
                ParamMarker::Path(name) if !path_names.insert(name.as_str()) => {
                    return Err(duplicated("path", name));
                }
                ParamMarker::Query(name) if !query_names.insert(name.as_str()) => {
                    return Err(duplicated("query", name));
                }
                ParamMarker::Header(name) if !header_names.insert(name.to_ascii_lowercase()) => {
                    return Err(duplicated("header", name));
                }
                ParamMarker::Body | ParamMarker::BodyMap => {
                    if has_body {
                        return Err(WaspError::MultipleBodies {
                            operation: declaration.id().to_string(),
                        });
                    }
                    has_body = true;
                }
                _ => {}
            }
        }
        // The last marker of a parameter defines its role
        result.push(param.markers().last().map(ParameterRole::from));
    }

    Ok(result)
}

// Accessors
impl EndpointMetadata {
    /// The declaration this metadata was extracted from.
    pub fn declaration(&self) -> &EndpointDeclaration {
        &self.declaration
    }

    /// Identity of the operation this metadata was extracted from.
    pub fn operation(&self) -> &OperationId {
        &self.operation
    }

    /// The relative path template, with `{name}` placeholders.
    pub fn relative_url_template(&self) -> &str {
        &self.relative_url_template
    }

    /// The HTTP method.
    pub fn http_method(&self) -> &Method {
        &self.http_method
    }

    /// The element type expected by the callback.
    pub fn response_element_type(&self) -> TypeDescriptor {
        self.response_element_type
    }

    /// One role per declared parameter, `None` for parameters without role.
    pub fn parameter_roles(&self) -> &[Option<ParameterRole>] {
        &self.parameter_roles
    }

    /// Number of arguments expected at call time (every parameter but the callback).
    pub fn argument_count(&self) -> usize {
        self.parameter_roles.len().saturating_sub(1)
    }

    /// Static headers declared on the operation.
    pub fn static_headers(&self) -> &IndexMap<String, String> {
        &self.static_headers
    }

    /// Whether the endpoint accepts auth-token injection in filtered mode.
    pub fn auth_enabled(&self) -> bool {
        self.auth_enabled
    }

    /// Endpoint-level base URL override.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Endpoint-level retry policy.
    pub fn retry_policy(&self) -> Option<&RetryPolicy> {
        self.retry_policy.as_ref()
    }

    /// Mock indirection declared on the operation.
    pub fn mock(&self) -> Option<&MockDescriptor> {
        self.mock.as_ref()
    }
}
