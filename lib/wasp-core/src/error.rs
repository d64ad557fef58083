/// Broad category of a [`WaspError`].
///
/// Declaration errors are permanent: the same declaration always fails the same way.
/// Binding errors depend on the arguments of a single call.
/// Precondition errors come from invalid inputs to the metadata cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The endpoint declaration is invalid.
    Declaration,
    /// The arguments of one invocation cannot be bound to the declared roles.
    Binding,
    /// An absent key or value was given to the metadata cache.
    Precondition,
    /// The client configuration is invalid.
    Configuration,
    /// A value could not be serialized.
    Serialization,
}

/// Errors that can occur while extracting metadata or assembling requests.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum WaspError {
    /// JSON serialization error.
    ///
    /// Occurs when an argument or a body cannot be converted to JSON.
    JsonValueError(serde_json::Error),

    /// URL parsing error when validating the configured endpoint.
    UrlError(url::ParseError),

    /// The declared HTTP verb is not a valid method token.
    InvalidMethod(http::method::InvalidMethod),

    /// Invalid HTTP header name.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// Invalid HTTP header value.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// No HTTP verb marker was declared on the operation.
    #[display("operation '{operation}': HTTP method annotation is required")]
    #[from(skip)]
    MissingHttpMethod {
        /// Name of the declared operation.
        operation: String,
    },

    /// A static header entry does not follow the `key:value` format.
    #[display("operation '{operation}': header '{entry}' must follow key:value format")]
    #[from(skip)]
    MalformedHeader {
        /// Name of the declared operation.
        operation: String,
        /// The offending entry.
        entry: String,
    },

    /// The operation declares no parameter at all.
    #[display("operation '{operation}': callback should be added as param")]
    #[from(skip)]
    MissingCallback {
        /// Name of the declared operation.
        operation: String,
    },

    /// The trailing parameter is not a callback.
    #[display("operation '{operation}': last parameter must be callback, got '{parameter}'")]
    #[from(skip)]
    InvalidCallback {
        /// Name of the declared operation.
        operation: String,
        /// Name of the trailing parameter.
        parameter: String,
    },

    /// Two parameters share the same role name.
    #[display("operation '{operation}': {role} name '{name}' should not be duplicated")]
    #[from(skip)]
    DuplicateName {
        /// Name of the declared operation.
        operation: String,
        /// Role kind (`path`, `query` or `header`).
        role: &'static str,
        /// The duplicated name.
        name: String,
    },

    /// More than one parameter carries the request body.
    #[display("operation '{operation}': only one body/bodyMap can be added")]
    #[from(skip)]
    MultipleBodies {
        /// Name of the declared operation.
        operation: String,
    },

    /// An argument is absent for a declared parameter.
    #[display("operation '{operation}': value cannot be null for parameter #{index} ({role})")]
    #[from(skip)]
    MissingArgument {
        /// Name of the declared operation.
        operation: String,
        /// Position of the parameter.
        index: usize,
        /// Description of the bound role.
        role: String,
    },

    /// The number of arguments does not match the declared parameters.
    #[display("operation '{operation}': expected {expected} arguments, got {actual}")]
    #[from(skip)]
    ArgumentCountMismatch {
        /// Name of the declared operation.
        operation: String,
        /// Number of declared value parameters.
        expected: usize,
        /// Number of supplied arguments.
        actual: usize,
    },

    /// An argument has a type incompatible with its role.
    #[display("operation '{operation}': {role} accepts only {expected}, got {value}")]
    #[from(skip)]
    UnsupportedArgument {
        /// Name of the declared operation.
        operation: String,
        /// Description of the bound role.
        role: String,
        /// What the role accepts.
        expected: &'static str,
        /// The rejected value.
        value: serde_json::Value,
    },

    /// An absent key was given to the metadata cache.
    #[display("key may not be null")]
    #[from(skip)]
    AbsentKey,

    /// An absent value was given to the metadata cache.
    #[display("value may not be null")]
    #[from(skip)]
    AbsentValue,

    /// The client endpoint is not configured or invalid.
    #[display("Invalid endpoint: {error}")]
    #[from(skip)]
    InvalidEndpoint {
        /// Description of why the endpoint is invalid.
        error: String,
    },
}

impl WaspError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingHttpMethod { .. }
            | Self::MalformedHeader { .. }
            | Self::MissingCallback { .. }
            | Self::InvalidCallback { .. }
            | Self::DuplicateName { .. }
            | Self::MultipleBodies { .. }
            | Self::InvalidMethod(_) => ErrorKind::Declaration,
            Self::MissingArgument { .. }
            | Self::ArgumentCountMismatch { .. }
            | Self::UnsupportedArgument { .. }
            | Self::InvalidHeaderName(_)
            | Self::InvalidHeaderValue(_) => ErrorKind::Binding,
            Self::AbsentKey | Self::AbsentValue => ErrorKind::Precondition,
            Self::UrlError(_) | Self::InvalidEndpoint { .. } => ErrorKind::Configuration,
            Self::JsonValueError(_) => ErrorKind::Serialization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wasp_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<WaspError>();
        assert_sync::<WaspError>();
    }

    #[test]
    fn test_error_kinds() {
        let error = WaspError::DuplicateName {
            operation: "fetchRepo".to_string(),
            role: "path",
            name: "id".to_string(),
        };
        assert_eq!(error.kind(), ErrorKind::Declaration);
        insta::assert_snapshot!(error, @"operation 'fetchRepo': path name 'id' should not be duplicated");

        let error = WaspError::MissingArgument {
            operation: "fetchRepo".to_string(),
            index: 1,
            role: "path(repo)".to_string(),
        };
        assert_eq!(error.kind(), ErrorKind::Binding);

        assert_eq!(WaspError::AbsentKey.kind(), ErrorKind::Precondition);
        assert_eq!(WaspError::AbsentValue.kind(), ErrorKind::Precondition);
    }
}
