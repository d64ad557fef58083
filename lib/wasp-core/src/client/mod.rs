use std::sync::Arc;

use tracing::debug;

use crate::arguments::Arguments;
use crate::assembler::RequestAssembler;
use crate::cache::MetadataCache;
use crate::declaration::EndpointDeclaration;
use crate::error::WaspError;
use crate::metadata::EndpointMetadata;
use crate::request::RequestDescriptor;

mod builder;
pub use self::builder::WaspBuilder;

/// Client surface turning declared endpoints into requests.
///
/// `Wasp` resolves the metadata of an endpoint through the shared
/// [`MetadataCache`], extracting it on first use, then assembles one
/// [`RequestDescriptor`] per invocation. Use [`WaspBuilder`] to create instances.
///
/// # Example
///
/// ```rust
/// use wasp_core::{Arguments, EndpointDeclaration, Wasp};
/// # #[derive(Debug)] struct Repo;
///
/// # fn main() -> Result<(), wasp_core::WaspError> {
/// let wasp = Wasp::builder()
///     .with_endpoint("https://api.example.com")
///     .build()?;
///
/// let fetch_repos = EndpointDeclaration::new("GitHubService", "fetchRepoBySearch")
///     .get("/users/{user}/repos")
///     .path("user")
///     .query("page")
///     .query("sort")
///     .callback::<Vec<Repo>>();
///
/// let request = wasp.request(
///     &fetch_repos,
///     &Arguments::new().arg("octocat").arg(1).arg("updated"),
/// )?;
///
/// assert_eq!(
///     request.url(),
///     "https://api.example.com/users/octocat/repos?page=1&sort=updated"
/// );
/// # Ok(())
/// # }
/// ```
///
/// # Thread Safety
///
/// `Wasp` is `Send + Sync` and cheap to clone; clones share the metadata cache.
#[derive(Debug, Clone)]
pub struct Wasp {
    assembler: RequestAssembler,
    cache: Arc<MetadataCache>,
}

// Create
impl Wasp {
    /// Creates a builder.
    pub fn builder() -> WaspBuilder {
        WaspBuilder::default()
    }
}

impl Wasp {
    /// The configured base URL.
    pub fn endpoint(&self) -> &str {
        self.assembler.base_url()
    }

    /// The metadata cache shared by this client.
    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    /// Returns the metadata of a declared operation, extracting it on first use.
    ///
    /// Cached metadata is only reused for the declaration it was extracted from,
    /// another declaration with the same identity replaces it.
    /// Declaration errors are never cached: a failing declaration fails again on the next call.
    ///
    /// # Errors
    ///
    /// Fails with a declaration error if the declaration is invalid.
    pub fn register(
        &self,
        declaration: &EndpointDeclaration,
    ) -> Result<Arc<EndpointMetadata>, WaspError> {
        let key = declaration.id();
        if let Some(metadata) = self.cache.get(&key)? {
            if metadata.declaration() == declaration {
                debug!(operation = %key, "metadata cache hit");
                return Ok(metadata);
            }
            debug!(operation = %key, "metadata cached for another declaration");
        }

        debug!(operation = %key, "metadata cache miss");
        let metadata = Arc::new(EndpointMetadata::extract(declaration)?);
        self.cache.put(key, Arc::clone(&metadata))?;
        Ok(metadata)
    }

    /// Builds the request of one invocation of a declared operation.
    ///
    /// # Errors
    ///
    /// Fails with a declaration error if the declaration is invalid,
    /// or a binding error if the arguments do not fit the declared parameters.
    pub fn request(
        &self,
        declaration: &EndpointDeclaration,
        arguments: &Arguments,
    ) -> Result<RequestDescriptor, WaspError> {
        let metadata = self.register(declaration)?;
        self.assembler.assemble(&metadata, arguments)
    }
}
