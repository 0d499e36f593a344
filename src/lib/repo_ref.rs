use std::fmt;

use anyhow::{bail, Context, Result};

pub static DEFAULT_HOST: &str = "github.com";

static INCORRECT_REPO_FORMAT_ERROR: &str =
    "expected the \"[HOST/]OWNER/REPO\" format, got";

/// Identifies a repository on a hosting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub host: String,
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Parses `OWNER/REPO`, `HOST/OWNER/REPO` or a clone url. `default_host`
    /// is used when the input doesn't name one.
    pub fn parse(input: &str, default_host: &str) -> Result<Self> {
        let input = input.trim();
        if input.contains("://") || is_scp_like(input) {
            return Self::from_remote_url(input);
        }
        let parts: Vec<&str> = input.split('/').collect();
        let (host, owner, name) = match parts.as_slice() {
            [owner, name] => (default_host, *owner, *name),
            [host, owner, name] => (*host, *owner, *name),
            _ => bail!("{INCORRECT_REPO_FORMAT_ERROR} \"{input}\""),
        };
        Self::from_parts(host, owner, name)
            .context(format!("{INCORRECT_REPO_FORMAT_ERROR} \"{input}\""))
    }

    /// Parses git remote urls such as `https://github.com/owner/repo.git`,
    /// `ssh://git@github.com/owner/repo.git` or `git@github.com:owner/repo`.
    pub fn from_remote_url(url: &str) -> Result<Self> {
        let (host, path) = if let Some((_, rest)) = url.split_once("://") {
            let (authority, path) = rest
                .split_once('/')
                .context(format!("remote url \"{url}\" has no path"))?;
            (strip_port(strip_credentials(authority)), path)
        } else if is_scp_like(url) {
            let (authority, path) = url
                .split_once(':')
                .context(format!("remote url \"{url}\" has no path"))?;
            (strip_credentials(authority), path)
        } else {
            bail!("\"{url}\" is not a recognised remote url");
        };
        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        match (segments.next(), segments.next(), segments.next()) {
            (Some(owner), Some(name), None) => Self::from_parts(host, owner, name),
            _ => bail!("remote url \"{url}\" does not point to an OWNER/REPO path"),
        }
    }

    fn from_parts(host: &str, owner: &str, name: &str) -> Result<Self> {
        if host.is_empty() || owner.is_empty() || name.is_empty() {
            bail!("repository host, owner and name must not be empty");
        }
        Ok(Self {
            host: host.to_lowercase(),
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn is_github_dot_com(&self) -> bool {
        self.host == DEFAULT_HOST || self.host == "www.github.com"
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_github_dot_com() {
            write!(f, "{}/{}", self.owner, self.name)
        } else {
            write!(f, "{}/{}/{}", self.host, self.owner, self.name)
        }
    }
}

fn is_scp_like(url: &str) -> bool {
    match (url.find(':'), url.find('/')) {
        (Some(colon), Some(slash)) => colon < slash,
        (Some(_), None) => true,
        _ => false,
    }
}

fn strip_credentials(authority: &str) -> &str {
    authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host)
}

fn strip_port(host: &str) -> &str {
    host.split_once(':').map_or(host, |(host, _)| host)
}
