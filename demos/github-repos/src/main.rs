#![allow(missing_docs)]
use std::sync::Arc;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};
use wasp_core::{
    Arguments, AuthToken, EndpointDeclaration, MockDescriptor, RequestInterceptor, Wasp,
};

#[derive(Debug)]
struct Repo;

#[derive(Debug, Serialize)]
struct Rename {
    name: String,
}

/// Adds the client identification and the session token to every request.
struct Session {
    token: Option<String>,
}

impl RequestInterceptor for Session {
    fn on_headers_added(&self, headers: &mut IndexMap<String, String>) {
        headers.insert("User-Agent".to_string(), "wasp-demo".to_string());
    }

    fn auth_token(&self) -> Option<AuthToken> {
        self.token
            .as_deref()
            .map(|token| AuthToken::filtered(format!("token {token}")))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().pretty().init();

    let AppArgs {
        endpoint,
        user,
        token,
    } = AppArgs::parse().context("parsing arguments")?;

    let wasp = Wasp::builder()
        .with_endpoint(endpoint)
        .with_interceptor(Arc::new(Session { token }))
        .with_url_encoding()
        .build()
        .context("building client")?;

    let fetch_repo = EndpointDeclaration::new("GitHubService", "fetchRepo")
        .get("/repos/{user}/{repo}")
        .path("user")
        .path("repo")
        .callback::<Repo>();
    let fetch_repo_by_search = EndpointDeclaration::new("GitHubService", "fetchRepoBySearch")
        .get("/users/{user}/repos")
        .path("user")
        .query("page")
        .query("sort")
        .callback::<Vec<Repo>>();
    let add_name = EndpointDeclaration::new("GitHubService", "addName")
        .post("/repos/{user}/{repo}")
        .headers(["Accept:application/vnd.github+json"])
        .auth()
        .mock(MockDescriptor::new(200).with_path("mocks/repo.json"))
        .path("user")
        .path("repo")
        .body()
        .callback::<Repo>();

    for declaration in [&fetch_repo, &fetch_repo_by_search, &add_name] {
        wasp.register(declaration)
            .with_context(|| format!("registering {}", declaration.id()))?;
    }

    let requests = [
        wasp.request(&fetch_repo, &Arguments::new().arg(user.as_str()).arg("wasp"))?,
        wasp.request(
            &fetch_repo_by_search,
            &Arguments::new().arg(user.as_str()).arg(1).arg("updated"),
        )?,
        wasp.request(
            &add_name,
            &Arguments::new()
                .arg(user.as_str())
                .arg("wasp")
                .try_arg(&Rename {
                    name: "hornet".to_string(),
                })?,
        )?,
    ];

    for request in &requests {
        info!(
            method = %request.method(),
            headers = ?request.headers(),
            mock = ?request.mock(),
            "{request}"
        );
    }

    info!("Bye!");
    Ok(())
}

#[derive(Debug)]
struct AppArgs {
    endpoint: String,
    user: String,
    token: Option<String>,
}

impl AppArgs {
    fn parse() -> Result<Self> {
        let mut pargs = pico_args::Arguments::from_env();

        let endpoint = pargs
            .opt_value_from_str(["-e", "--endpoint"])
            .context("parsing endpoint argument")?;

        let user = pargs
            .opt_value_from_str(["-u", "--user"])
            .context("parsing user argument")?;

        let token = pargs
            .opt_value_from_str(["-t", "--token"])
            .context("parsing token argument")?;

        let result = Self {
            endpoint: endpoint.unwrap_or_else(|| "https://api.github.com".to_string()),
            user: user.unwrap_or_else(|| "orhanobut".to_string()),
            token,
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            warn!(?remaining, "Warning: unused arguments left");
        }
        Ok(result)
    }
}
