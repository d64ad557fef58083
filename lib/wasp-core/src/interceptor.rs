//! Cross-cutting contributions to every assembled request.
//!
//! A [`RequestInterceptor`] is consulted after the per-call arguments are bound.
//! It may add query parameters and headers, provide an auth token and a
//! fallback retry policy.

use std::fmt;

use indexmap::IndexMap;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::retry::RetryPolicy;

/// Name of the header carrying the auth token.
pub const AUTHORIZATION: &str = "Authorization";

/// Token text, zeroed on drop and never printed in clear.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// The token text, as sent in the `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureString(<redacted>)")
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Auth token provided by an interceptor.
///
/// When the filter is disabled the token is sent with every request.
/// When enabled, only endpoints declared with the auth marker receive it.
#[derive(Debug, Clone)]
pub struct AuthToken {
    token: SecureString,
    filter_enabled: bool,
}

impl AuthToken {
    /// A token sent with every request.
    pub fn new(token: impl Into<SecureString>) -> Self {
        Self {
            token: token.into(),
            filter_enabled: false,
        }
    }

    /// A token sent only to endpoints declared with the auth marker.
    pub fn filtered(token: impl Into<SecureString>) -> Self {
        Self {
            token: token.into(),
            filter_enabled: true,
        }
    }

    /// The token value.
    pub fn token(&self) -> &SecureString {
        &self.token
    }

    /// Whether the token is restricted to auth-enabled endpoints.
    pub fn is_filter_enabled(&self) -> bool {
        self.filter_enabled
    }
}

/// Call-time contributions applied to every request.
///
/// Every method has a default doing nothing, implement only what you need.
///
/// # Example
///
/// ```rust
/// use indexmap::IndexMap;
/// use wasp_core::{AuthToken, RequestInterceptor};
///
/// struct ApiKey;
///
/// impl RequestInterceptor for ApiKey {
///     fn on_headers_added(&self, headers: &mut IndexMap<String, String>) {
///         headers.insert("X-Api-Version".to_string(), "2".to_string());
///     }
///
///     fn auth_token(&self) -> Option<AuthToken> {
///         Some(AuthToken::filtered("secret"))
///     }
/// }
/// ```
pub trait RequestInterceptor: Send + Sync {
    /// Adds query parameters, appended in the sink's order.
    fn on_query_params_added(&self, _params: &mut IndexMap<String, serde_json::Value>) {}

    /// Adds headers, overwriting headers with the same name.
    fn on_headers_added(&self, _headers: &mut IndexMap<String, String>) {}

    /// The auth token, if any.
    fn auth_token(&self) -> Option<AuthToken> {
        None
    }

    /// Retry policy used when the endpoint declares none.
    fn retry_policy(&self) -> Option<RetryPolicy> {
        None
    }
}

/// A [`RequestInterceptor`] returning fixed contributions.
#[derive(Debug, Clone, Default)]
pub struct SimpleInterceptor {
    query_params: IndexMap<String, serde_json::Value>,
    headers: IndexMap<String, String>,
    auth_token: Option<AuthToken>,
    retry_policy: Option<RetryPolicy>,
}

impl SimpleInterceptor {
    /// Creates an interceptor contributing nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a query parameter to every request.
    pub fn add_query_param(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    /// Adds a header to every request.
    pub fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the auth token.
    pub fn with_auth_token(mut self, token: AuthToken) -> Self {
        self.auth_token = Some(token);
        self
    }

    /// Sets the fallback retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }
}

impl RequestInterceptor for SimpleInterceptor {
    fn on_query_params_added(&self, params: &mut IndexMap<String, serde_json::Value>) {
        params.extend(
            self.query_params
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
    }

    fn on_headers_added(&self, headers: &mut IndexMap<String, String>) {
        headers.extend(
            self.headers
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
    }

    fn auth_token(&self) -> Option<AuthToken> {
        self.auth_token.clone()
    }

    fn retry_policy(&self) -> Option<RetryPolicy> {
        self.retry_policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_string_is_never_printed() {
        let token = AuthToken::new("very-secret-token-12345");

        assert_eq!(token.token().as_str(), "very-secret-token-12345");
        assert_eq!(token.token().to_string(), "***");
        insta::assert_snapshot!(format!("{token:?}"), @"AuthToken { token: SecureString(<redacted>), filter_enabled: false }");
    }

    #[test]
    fn test_auth_token_filter() {
        assert!(!AuthToken::new("token").is_filter_enabled());
        assert!(AuthToken::filtered("token").is_filter_enabled());
    }

    #[test]
    fn test_simple_interceptor_contributions() {
        let interceptor = SimpleInterceptor::new()
            .add_query_param("api_key", "k")
            .add_query_param("v", 2)
            .add_header("X-Client", "wasp");

        let mut params = IndexMap::new();
        interceptor.on_query_params_added(&mut params);
        let mut headers = IndexMap::new();
        interceptor.on_headers_added(&mut headers);

        let names: Vec<_> = params.keys().cloned().collect();
        assert_eq!(names, vec!["api_key", "v"]);
        assert_eq!(headers.get("X-Client").map(String::as_str), Some("wasp"));
        assert!(interceptor.auth_token().is_none());
        assert!(interceptor.retry_policy().is_none());
    }
}
