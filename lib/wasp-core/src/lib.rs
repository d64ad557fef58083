//! # Wasp Core
//!
//! Turn declared HTTP endpoints into transport-ready requests.
//!
//! An endpoint is described once, as an [`EndpointDeclaration`]: HTTP verb and
//! path template, parameter roles, static headers. Each invocation, together
//! with its [`Arguments`], is then compiled into an immutable
//! [`RequestDescriptor`] holding the URL, method, headers, body, retry policy,
//! correlation tag and mock indirection.
//!
//! The pipeline has three parts:
//! - **[`EndpointMetadata::extract`]** validates a declaration once
//! - **[`WaspCache`]** memoizes the extracted metadata per operation
//! - **[`RequestAssembler`]** binds arguments and interceptor contributions
//!
//! [`Wasp`] wires the three together.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use wasp_core::{Arguments, AuthToken, EndpointDeclaration, SimpleInterceptor, Wasp};
//! # #[derive(Debug)] struct Repo;
//!
//! # fn main() -> Result<(), wasp_core::WaspError> {
//! let wasp = Wasp::builder()
//!     .with_endpoint("https://api.github.com")
//!     .with_interceptor(Arc::new(
//!         SimpleInterceptor::new().with_auth_token(AuthToken::filtered("token")),
//!     ))
//!     .build()?;
//!
//! let add_name = EndpointDeclaration::new("GitHubService", "addName")
//!     .post("/repos/{user}/{repo}")
//!     .headers(["Accept:application/json"])
//!     .auth()
//!     .path("user")
//!     .path("repo")
//!     .body()
//!     .callback::<Repo>();
//!
//! let request = wasp.request(
//!     &add_name,
//!     &Arguments::new()
//!         .arg("orhanobut")
//!         .arg("wasp")
//!         .arg(serde_json::json!({"name": "wasp"})),
//! )?;
//!
//! assert_eq!(request.url(), "https://api.github.com/repos/orhanobut/wasp");
//! assert_eq!(request.header("Authorization"), Some("token"));
//! assert_eq!(request.body(), Some(r#"{"name":"wasp"}"#));
//! # Ok(())
//! # }
//! ```
//!
//! ## Precedence
//!
//! Headers are resolved in this order, later steps overwriting earlier ones
//! except for static headers:
//! 1. header arguments
//! 2. static headers, only when not already set
//! 3. interceptor headers
//! 4. the interceptor auth token, as `Authorization`
//!
//! The endpoint retry policy wins over the interceptor one.
//!
//! ## Errors
//!
//! Every failure is a [`WaspError`]; [`WaspError::kind`] tells declaration
//! errors (invalid endpoint declaration), binding errors (invalid call
//! arguments) and precondition errors (absent cache key or value) apart.

mod arguments;
pub use self::arguments::Arguments;

mod assembler;
pub use self::assembler::RequestAssembler;

mod cache;
pub use self::cache::{MetadataCache, Presence, WaspCache};

mod client;
pub use self::client::{Wasp, WaspBuilder};

pub mod declaration;
pub use self::declaration::{
    EndpointDeclaration, MethodMarker, OperationId, ParamDeclaration, ParamKind, ParamMarker,
    TypeDescriptor,
};

mod error;
pub use self::error::{ErrorKind, WaspError};

pub mod interceptor;
pub use self::interceptor::{AuthToken, RequestInterceptor, SecureString, SimpleInterceptor};

mod metadata;
pub use self::metadata::{EndpointMetadata, ParameterRole};

mod parser;
pub use self::parser::{JsonParser, Parser};

mod request;
pub use self::request::{MockDescriptor, RequestDescriptor};

mod retry;
pub use self::retry::RetryPolicy;
