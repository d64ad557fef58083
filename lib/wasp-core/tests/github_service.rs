//! End-to-end scenarios against a GitHub-like service declaration.
#![allow(missing_docs)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use indexmap::IndexMap;
use serde::Serialize;
use wasp_core::{
    Arguments, AuthToken, EndpointDeclaration, ErrorKind, MetadataCache,
    RequestInterceptor, RetryPolicy, Wasp,
};

#[derive(Debug)]
struct Repo;

#[derive(Debug, Serialize)]
struct NewRepo {
    name: String,
    private: bool,
}

struct Session {
    token: Option<&'static str>,
}

impl RequestInterceptor for Session {
    fn on_query_params_added(&self, params: &mut IndexMap<String, serde_json::Value>) {
        params.insert("per_page".to_string(), 50.into());
    }

    fn on_headers_added(&self, headers: &mut IndexMap<String, String>) {
        headers.insert("User-Agent".to_string(), "wasp-tests".to_string());
    }

    fn auth_token(&self) -> Option<AuthToken> {
        self.token.map(AuthToken::filtered)
    }

    fn retry_policy(&self) -> Option<RetryPolicy> {
        Some(RetryPolicy::new(Duration::from_secs(10), 2, 1.5))
    }
}

fn fetch_repo_by_search() -> EndpointDeclaration {
    EndpointDeclaration::new("GitHubService", "fetchRepoBySearch")
        .get("/users/{user}/repos")
        .path("user")
        .query("page")
        .query("sort")
        .callback::<Vec<Repo>>()
}

fn create_repo() -> EndpointDeclaration {
    EndpointDeclaration::new("GitHubService", "createRepo")
        .post("/user/repos")
        .headers(["Accept:application/vnd.github+json"])
        .auth()
        .body()
        .tag()
        .callback::<Repo>()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn should_build_search_request() -> Result<()> {
    init_tracing();
    let wasp = Wasp::builder()
        .with_endpoint("https://api.example.com")
        .build()?;

    let request = wasp.request(
        &fetch_repo_by_search(),
        &Arguments::new().arg("octocat").arg(1).arg("updated"),
    )?;

    assert_eq!(
        request.url(),
        "https://api.example.com/users/octocat/repos?page=1&sort=updated"
    );
    assert_eq!(request.method().as_str(), "GET");
    assert!(request.headers().is_empty());
    assert!(request.body().is_none());
    Ok(())
}

#[test]
fn should_apply_interceptor_to_every_request() -> Result<()> {
    init_tracing();
    let wasp = Wasp::builder()
        .with_endpoint("https://api.example.com")
        .with_interceptor(Arc::new(Session {
            token: Some("secret"),
        }))
        .build()?;

    let search = wasp.request(
        &fetch_repo_by_search(),
        &Arguments::new().arg("octocat").arg(2).arg("stars"),
    )?;
    assert_eq!(
        search.url(),
        "https://api.example.com/users/octocat/repos?page=2&sort=stars&per_page=50"
    );
    assert_eq!(search.header("User-Agent"), Some("wasp-tests"));
    assert_eq!(search.header("Authorization"), None);
    assert_eq!(search.retry_policy().map(RetryPolicy::max_retries), Some(2));

    let new_repo = NewRepo {
        name: "wasp".to_string(),
        private: false,
    };
    let create = wasp.request(
        &create_repo(),
        &Arguments::new().try_arg(&new_repo)?.arg("create-1"),
    )?;
    assert_eq!(create.url(), "https://api.example.com/user/repos?per_page=50");
    assert_eq!(create.header("Authorization"), Some("secret"));
    assert_eq!(
        create.header("Accept"),
        Some("application/vnd.github+json")
    );
    assert_eq!(create.body(), Some(r#"{"name":"wasp","private":false}"#));
    assert_eq!(create.tag(), Some("create-1"));

    let header_map = create.header_map()?;
    assert_eq!(header_map.len(), 3);
    Ok(())
}

#[test]
fn should_surface_declaration_errors_at_registration() -> Result<()> {
    let wasp = Wasp::builder()
        .with_endpoint("https://api.example.com")
        .build()?;
    let invalid = EndpointDeclaration::new("GitHubService", "broken")
        .get("/search")
        .query("page")
        .query("page")
        .callback::<Vec<Repo>>();

    let error = wasp.register(&invalid).expect_err("duplicated query name");

    assert_eq!(error.kind(), ErrorKind::Declaration);
    Ok(())
}

#[test]
fn should_share_the_cache_across_threads() -> Result<()> {
    let cache = Arc::new(MetadataCache::new());
    let wasp = Wasp::builder()
        .with_endpoint("https://api.example.com")
        .with_cache(Arc::clone(&cache))
        .build()?;

    thread::scope(|scope| {
        for index in 0..8 {
            let wasp = &wasp;
            scope.spawn(move || {
                let declaration = if index % 2 == 0 {
                    fetch_repo_by_search()
                } else {
                    create_repo()
                };
                for _ in 0..50 {
                    wasp.register(&declaration).expect("valid declaration");
                }
            });
        }
    });

    assert_eq!(cache.len(), 2);
    let mut keys = cache.keys();
    keys.sort();
    assert_eq!(keys, vec![create_repo().id(), fetch_repo_by_search().id()]);
    Ok(())
}
