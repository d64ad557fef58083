use std::sync::Arc;

use url::Url;

use super::Wasp;
use crate::assembler::RequestAssembler;
use crate::cache::MetadataCache;
use crate::error::WaspError;
use crate::interceptor::RequestInterceptor;
use crate::parser::{JsonParser, Parser};

/// Builder for creating [`Wasp`] instances.
///
/// # Default Configuration
///
/// - **Endpoint**: none, it must be set with [`with_endpoint`](Self::with_endpoint)
/// - **Parser**: [`JsonParser`]
/// - **Interceptor**: none
/// - **Cache**: a new, empty metadata cache
/// - **URL encoding**: disabled, path and query values are used as is
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use wasp_core::{AuthToken, SimpleInterceptor, Wasp};
///
/// # fn main() -> Result<(), wasp_core::WaspError> {
/// let wasp = Wasp::builder()
///     .with_endpoint("https://api.github.com")
///     .with_interceptor(Arc::new(
///         SimpleInterceptor::new()
///             .add_header("User-Agent", "wasp")
///             .with_auth_token(AuthToken::filtered("token")),
///     ))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, derive_more::Debug)]
pub struct WaspBuilder {
    endpoint: Option<String>,
    parser: Arc<dyn Parser>,
    #[debug(skip)]
    interceptor: Option<Arc<dyn RequestInterceptor>>,
    cache: Option<Arc<MetadataCache>>,
    url_encoding: bool,
}

impl Default for WaspBuilder {
    fn default() -> Self {
        Self {
            endpoint: None,
            parser: Arc::new(JsonParser),
            interceptor: None,
            cache: None,
            url_encoding: false,
        }
    }
}

impl WaspBuilder {
    /// Builds the final [`Wasp`] instance.
    ///
    /// # Errors
    ///
    /// Fails if the endpoint:
    /// - is not set, or empty
    /// - is not an absolute URL
    /// - ends with `/`, since path templates start with one
    pub fn build(self) -> Result<Wasp, WaspError> {
        let Self {
            endpoint,
            parser,
            interceptor,
            cache,
            url_encoding,
        } = self;

        let Some(endpoint) = endpoint.filter(|it| !it.is_empty()) else {
            return Err(WaspError::InvalidEndpoint {
                error: "end point may not be null".to_string(),
            });
        };
        if endpoint.ends_with('/') {
            return Err(WaspError::InvalidEndpoint {
                error: format!("end point should not end with '/': {endpoint}"),
            });
        }
        Url::parse(&endpoint)?;

        let assembler = RequestAssembler::new(endpoint, parser);
        let assembler = match interceptor {
            Some(interceptor) => assembler.with_interceptor(interceptor),
            None => assembler,
        };
        let assembler = if url_encoding {
            assembler.with_url_encoding()
        } else {
            assembler
        };

        Ok(Wasp {
            assembler,
            cache: cache.unwrap_or_default(),
        })
    }

    /// Sets the base URL of every endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the body serializer.
    pub fn with_parser(mut self, parser: Arc<dyn Parser>) -> Self {
        self.parser = parser;
        self
    }

    /// Sets the interceptor consulted for every request.
    pub fn with_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    /// Percent-encodes path values and query parameters.
    pub fn with_url_encoding(mut self) -> Self {
        self.url_encoding = true;
        self
    }

    /// Shares an existing metadata cache.
    pub fn with_cache(mut self, cache: Arc<MetadataCache>) -> Self {
        self.cache = Some(cache);
        self
    }
}
