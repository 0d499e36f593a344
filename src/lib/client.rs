// async fn in traits that also need mocking in unit tests: async-trait boxes
// the futures so that mockall's automock can generate an implementation.
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
#[cfg(test)]
use mockall::*;
use reqwest::header::ACCEPT;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use crate::{
    commit::{AheadSet, CommitRef},
    config::{api_url_for, get_token, ConfigManagement},
    repo_ref::RepoRef,
};

static API_VERSION: &str = "2022-11-28";
static REQUEST_TIMEOUT: u64 = 30;
/// the largest page the compare endpoint serves
static MAX_PER_PAGE: u16 = 100;

/// The host's view of two refs. The host decides the merge base; we only
/// consume what it returns.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Compare: Send + Sync {
    /// Commits reachable from `head` but not from `base`, with full parent
    /// lists.
    async fn compare(&self, repo: &RepoRef, base: &str, head: &str) -> Result<AheadSet>;
    /// Resolve a branch, tag or abbreviated sha to a full commit id.
    async fn resolve_head(&self, repo: &RepoRef, reference: &str) -> Result<String>;
}

pub struct Client {
    http: reqwest::Client,
    api_url: String,
    token: Option<String>,
    per_page: u16,
}

pub struct Params {
    pub api_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
    pub per_page: u16,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: None,
            timeout: Duration::from_secs(REQUEST_TIMEOUT),
            per_page: MAX_PER_PAGE,
        }
    }
}

impl Params {
    pub fn for_repo(repo: &RepoRef, config_manager: &impl ConfigManagement) -> Result<Self> {
        Ok(Self {
            api_url: api_url_for(repo),
            token: get_token(repo, config_manager)?,
            ..Self::default()
        })
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_per_page(mut self, per_page: u16) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }
}

impl Client {
    pub fn new(params: Params) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("gh-merge-base-next/", env!("CARGO_PKG_VERSION")))
            .timeout(params.timeout)
            .build()?;
        Ok(Self {
            http,
            api_url: params.api_url,
            token: params.token,
            per_page: params.per_page,
        })
    }

    fn repo_path(repo: &RepoRef) -> String {
        format!(
            "/repos/{}/{}",
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.name)
        )
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{path}", self.api_url);
        debug!(%url, ?query, "GET");
        let mut request = self
            .http
            .get(&url)
            .query(query)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);
            bail!("GET {url}: {status} {message}");
        }
        Ok(response.json::<T>().await?)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct CompareResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    total_commits: usize,
    #[serde(default)]
    commits: Vec<CommitRef>,
}

#[async_trait]
impl Compare for Client {
    async fn compare(&self, repo: &RepoRef, base: &str, head: &str) -> Result<AheadSet> {
        let path = format!(
            "{}/compare/{}...{}",
            Self::repo_path(repo),
            urlencoding::encode(base),
            urlencoding::encode(head)
        );
        let mut commits = vec![];
        let mut page: u32 = 1;
        loop {
            let response: CompareResponse = self
                .get(
                    &path,
                    &[
                        ("per_page", self.per_page.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;
            let received = response.commits.len();
            debug!(
                page,
                received,
                total = response.total_commits,
                status = response.status.as_deref().unwrap_or("unknown"),
                "compare page"
            );
            commits.extend(response.commits);
            if received == 0 || commits.len() >= response.total_commits {
                break;
            }
            page += 1;
        }
        Ok(AheadSet::new(commits))
    }

    async fn resolve_head(&self, repo: &RepoRef, reference: &str) -> Result<String> {
        let path = format!(
            "{}/commits/{}",
            Self::repo_path(repo),
            urlencoding::encode(reference)
        );
        let commit: CommitRef = self.get(&path, &[]).await?;
        Ok(commit.sha)
    }
}
