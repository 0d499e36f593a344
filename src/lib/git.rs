use std::{env::current_dir, path::Path};

use anyhow::{Context, Result};
use tracing::debug;

use crate::repo_ref::RepoRef;

/// Remotes checked, in order, when inferring the hosted repository from a
/// local clone.
pub static PREFERRED_REMOTES: [&str; 3] = ["upstream", "github", "origin"];

pub struct Repo {
    pub git_repo: git2::Repository,
}

impl Repo {
    pub fn discover() -> Result<Self> {
        Ok(Self {
            git_repo: git2::Repository::discover(current_dir()?)?,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self {
            git_repo: git2::Repository::open(path)?,
        })
    }
}

pub trait RepoActions {
    fn get_remote_names(&self) -> Result<Vec<String>>;
    fn get_remote_url(&self, name: &str) -> Result<String>;
    fn get_hosted_repo_ref(&self) -> Result<Option<RepoRef>>;
}

impl RepoActions for Repo {
    fn get_remote_names(&self) -> Result<Vec<String>> {
        Ok(self
            .git_repo
            .remotes()
            .context("failed to list git remotes")?
            .iter()
            .flatten()
            .map(std::string::ToString::to_string)
            .collect())
    }

    fn get_remote_url(&self, name: &str) -> Result<String> {
        let remote = self
            .git_repo
            .find_remote(name)
            .context(format!("cannot find remote {name}"))?;
        Ok(remote
            .url()
            .context(format!("remote {name} has no url or it is not valid utf-8"))?
            .to_string())
    }

    /// First remote (preferred names first) whose url names an OWNER/REPO.
    fn get_hosted_repo_ref(&self) -> Result<Option<RepoRef>> {
        let names = self.get_remote_names()?;
        let ordered = PREFERRED_REMOTES
            .iter()
            .filter(|preferred| names.iter().any(|n| n == *preferred))
            .map(|n| (*n).to_string())
            .chain(
                names
                    .iter()
                    .filter(|n| !PREFERRED_REMOTES.contains(&n.as_str()))
                    .cloned(),
            );
        for name in ordered {
            let url = self.get_remote_url(&name)?;
            match RepoRef::from_remote_url(&url) {
                Ok(repo_ref) => {
                    debug!(remote = %name, %url, "using remote to identify repository");
                    return Ok(Some(repo_ref));
                }
                Err(error) => debug!(remote = %name, %url, %error, "skipping remote"),
            }
        }
        Ok(None)
    }
}
