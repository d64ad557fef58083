//! Declarations of endpoint operations.
//!
//! An [`EndpointDeclaration`] is the language-native description of one
//! endpoint operation: its method-level markers and its ordered parameters,
//! each optionally carrying role markers. It is the input of metadata
//! extraction, see [`EndpointMetadata::extract`](crate::EndpointMetadata::extract).
//!
//! ```rust
//! use wasp_core::EndpointDeclaration;
//! # #[derive(Debug)] struct Repo;
//!
//! let declaration = EndpointDeclaration::new("GitHubService", "fetchRepo")
//!     .get("/repos/{user}/{repo}")
//!     .path("user")
//!     .path("repo")
//!     .callback::<Repo>();
//!
//! assert_eq!(declaration.params().len(), 3);
//! ```

use std::any::TypeId;
use std::fmt;

use crate::request::MockDescriptor;
use crate::retry::RetryPolicy;

/// Identity of an endpoint operation, used as the metadata cache key.
///
/// Operations sharing a name are told apart by their parameter signature, see
/// [`EndpointDeclaration::id`]. The signature is left out of the `Display` form.
///
/// The empty identity is considered absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct OperationId {
    service: String,
    operation: String,
    signature: Vec<String>,
}

impl OperationId {
    /// Creates an operation identity from a service and an operation name.
    pub fn new(service: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            operation: operation.into(),
            signature: Vec::new(),
        }
    }

    /// Sets the parameter signature, one entry per parameter.
    pub fn with_signature<I, S>(mut self, signature: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signature = signature.into_iter().map(Into::into).collect();
        self
    }

    /// The service (declaring type) name.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The operation name.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// The parameter signature.
    pub fn signature(&self) -> &[String] {
        &self.signature
    }

    /// Returns `true` if the identity has no operation name.
    pub fn is_empty(&self) -> bool {
        self.operation.is_empty()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.service.is_empty() {
            write!(f, "{}", self.operation)
        } else {
            write!(f, "{}.{}", self.service, self.operation)
        }
    }
}

/// Runtime description of a Rust type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    /// Describes the type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The `TypeId` of the described type.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The full name of the described type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if this describes `T`.
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

/// Method-level marker of an endpoint operation.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodMarker {
    /// HTTP verb with its relative path template, e.g. `GET /users/{user}`.
    Http {
        /// The HTTP verb.
        method: String,
        /// The path template.
        path: String,
    },
    /// Static headers in `key:value` format.
    Headers(Vec<String>),
    /// The endpoint is eligible for auth-token injection.
    Auth,
    /// Base URL override for this endpoint.
    EndPoint(String),
    /// Endpoint-level retry policy.
    RetryPolicy(RetryPolicy),
    /// Mock response indirection.
    Mock(MockDescriptor),
}

/// Role marker carried by a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamMarker {
    /// Replaces `{name}` in the path template.
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

impl fmt::Display for ParamMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(name) => write!(f, "@path({name})"),
            Self::Query(name) => write!(f, "@query({name})"),
            Self::Header(name) => write!(f, "@header({name})"),
            Self::Body => write!(f, "@body"),
            Self::BodyMap => write!(f, "@bodyMap"),
            Self::Tag => write!(f, "@tag"),
        }
    }
}

/// Kind of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A value supplied at call time.
    Value,
    /// The result carrier, with the element type it expects.
    Callback(TypeDescriptor),
}

/// A declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDeclaration {
    name: String,
    kind: ParamKind,
    markers: Vec<ParamMarker>,
}

impl ParamDeclaration {
    /// Creates a value parameter without any marker.
    pub fn value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Value,
            markers: Vec::new(),
        }
    }

    /// Creates a callback parameter expecting elements of type `T`.
    pub fn callback<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Callback(TypeDescriptor::of::<T>()),
            markers: Vec::new(),
        }
    }

    /// Adds a role marker to the parameter.
    pub fn with_marker(mut self, marker: ParamMarker) -> Self {
        self.markers.push(marker);
        self
    }

    /// The parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameter kind.
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// The role markers, in declaration order.
    pub fn markers(&self) -> &[ParamMarker] {
        &self.markers
    }

    /// Signature of the parameter: its markers and kind, e.g. `@path(user) value`.
    pub fn signature(&self) -> String {
        let kind = match self.kind {
            ParamKind::Value => "value".to_string(),
            ParamKind::Callback(element_type) => format!("callback<{}>", element_type.name()),
        };
        self.markers
            .iter()
            .map(ToString::to_string)
            .chain([kind])
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Declaration of one endpoint operation.
///
/// Parameters are appended in order; the trailing parameter must be a
/// callback, see [`EndpointDeclaration::callback`].
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointDeclaration {
    id: OperationId,
    markers: Vec<MethodMarker>,
    params: Vec<ParamDeclaration>,
}

impl EndpointDeclaration {
    /// Creates an empty declaration for `service::operation`.
    pub fn new(service: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            id: OperationId::new(service, operation),
            markers: Vec::new(),
            params: Vec::new(),
        }
    }

    /// The operation identity, with the signature of the declared parameters.
    pub fn id(&self) -> OperationId {
        self.id
            .clone()
            .with_signature(self.params.iter().map(ParamDeclaration::signature))
    }

    /// The method-level markers, in declaration order.
    pub fn markers(&self) -> &[MethodMarker] {
        &self.markers
    }

    /// The declared parameters, in order.
    pub fn params(&self) -> &[ParamDeclaration] {
        &self.params
    }

    /// Adds a method-level marker.
    pub fn with_marker(mut self, marker: MethodMarker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Appends a parameter.
    pub fn with_param(mut self, param: ParamDeclaration) -> Self {
        self.params.push(param);
        self
    }

    /// Declares the HTTP verb and path template.
    pub fn http(self, method: impl Into<String>, path: impl Into<String>) -> Self {
        self.with_marker(MethodMarker::Http {
            method: method.into(),
            path: path.into(),
        })
    }

    /// Declares a `GET` endpoint.
    pub fn get(self, path: impl Into<String>) -> Self {
        self.http("GET", path)
    }

    /// Declares a `POST` endpoint.
    pub fn post(self, path: impl Into<String>) -> Self {
        self.http("POST", path)
    }

    /// Declares a `PUT` endpoint.
    pub fn put(self, path: impl Into<String>) -> Self {
        self.http("PUT", path)
    }

    /// Declares a `PATCH` endpoint.
    pub fn patch(self, path: impl Into<String>) -> Self {
        self.http("PATCH", path)
    }

    /// Declares a `DELETE` endpoint.
    pub fn delete(self, path: impl Into<String>) -> Self {
        self.http("DELETE", path)
    }

    /// Declares a `HEAD` endpoint.
    pub fn head(self, path: impl Into<String>) -> Self {
        self.http("HEAD", path)
    }

    /// Declares static headers, each in `key:value` format.
    pub fn headers<I, S>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers = headers.into_iter().map(Into::into).collect();
        self.with_marker(MethodMarker::Headers(headers))
    }

    /// Marks the endpoint as eligible for auth-token injection.
    pub fn auth(self) -> Self {
        self.with_marker(MethodMarker::Auth)
    }

    /// Overrides the base URL for this endpoint.
    pub fn endpoint(self, base_url: impl Into<String>) -> Self {
        self.with_marker(MethodMarker::EndPoint(base_url.into()))
    }

    /// Declares an endpoint-level retry policy.
    pub fn retry_policy(self, policy: RetryPolicy) -> Self {
        self.with_marker(MethodMarker::RetryPolicy(policy))
    }

    /// Declares a mock response for this endpoint.
    pub fn mock(self, mock: MockDescriptor) -> Self {
        self.with_marker(MethodMarker::Mock(mock))
    }

    /// Appends a path parameter.
    pub fn path(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.with_param(ParamDeclaration::value(name.clone()).with_marker(ParamMarker::Path(name)))
    }

    /// Appends a query parameter.
    pub fn query(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.with_param(ParamDeclaration::value(name.clone()).with_marker(ParamMarker::Query(name)))
    }

    /// Appends a header parameter.
    pub fn header(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.with_param(
            ParamDeclaration::value(name.clone()).with_marker(ParamMarker::Header(name)),
        )
    }

    /// Appends the body parameter.
    pub fn body(self) -> Self {
        self.with_param(ParamDeclaration::value("body").with_marker(ParamMarker::Body))
    }

    /// Appends the body-map parameter.
    pub fn body_map(self) -> Self {
        self.with_param(ParamDeclaration::value("bodyMap").with_marker(ParamMarker::BodyMap))
    }

    /// Appends the tag parameter.
    pub fn tag(self) -> Self {
        self.with_param(ParamDeclaration::value("tag").with_marker(ParamMarker::Tag))
    }

    /// Appends the trailing callback parameter expecting elements of type `T`.
    pub fn callback<T: ?Sized + 'static>(self) -> Self {
        self.with_param(ParamDeclaration::callback::<T>("callback"))
    }
}
