use std::{collections::HashMap, env, fs::File, io::BufReader, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
#[cfg(test)]
use mockall::*;
use serde::{self, Deserialize};
use tracing::debug;

use crate::repo_ref::{RepoRef, DEFAULT_HOST};

/// Reads the `hosts.yml` that the gh cli maintains. Nothing is ever written
/// back.
#[derive(Default)]
#[allow(clippy::module_name_repetitions)]
pub struct ConfigManager {
    dir: Option<PathBuf>,
}

#[cfg_attr(test, automock)]
#[allow(clippy::module_name_repetitions)]
pub trait ConfigManagement {
    fn load(&self) -> Result<HostsConfig>;
}

impl ConfigManager {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir: Some(dir) }
    }
}

/// `$GH_CONFIG_DIR`, `$XDG_CONFIG_HOME/gh` or `~/.config/gh`.
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("GH_CONFIG_DIR").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir).join("gh"));
    }
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("gh"))
        .ok_or(anyhow!(
            "should find operating system home directory with rust-directories crate"
        ))
}

impl ConfigManagement for ConfigManager {
    fn load(&self) -> Result<HostsConfig> {
        let dir = match &self.dir {
            Some(dir) => dir.clone(),
            None => get_config_dir()?,
        };
        let hosts_path = dir.join("hosts.yml");
        if hosts_path.exists() {
            debug!(path = %hosts_path.display(), "reading gh hosts config");
            let file = File::open(&hosts_path).context("should open gh hosts.yml")?;
            let reader = BufReader::new(file);
            let hosts: Option<HashMap<String, HostEntry>> = serde_yaml::from_reader(reader)
                .context("should read gh hosts.yml with serde_yaml")?;
            Ok(HostsConfig {
                hosts: hosts.unwrap_or_default(),
            })
        } else {
            Ok(HostsConfig::default())
        }
    }
}

#[derive(Deserialize, Default, Clone, Debug, PartialEq, Eq)]
pub struct HostsConfig {
    pub hosts: HashMap<String, HostEntry>,
}

#[derive(Deserialize, Default, Clone, Debug, PartialEq, Eq)]
pub struct HostEntry {
    #[serde(default)]
    pub oauth_token: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

/// `GH_HOST` or github.com
pub fn default_host() -> String {
    env::var("GH_HOST")
        .ok()
        .filter(|h| !h.is_empty())
        .unwrap_or(DEFAULT_HOST.to_string())
}

/// `GITHUB_API_URL` wins, otherwise derived from the host.
pub fn api_url_for(repo: &RepoRef) -> String {
    if let Ok(url) = env::var("GITHUB_API_URL") {
        if !url.is_empty() {
            return url.trim_end_matches('/').to_string();
        }
    }
    if repo.is_github_dot_com() {
        "https://api.github.com".to_string()
    } else {
        format!("https://{}/api/v3", repo.host)
    }
}

/// Token from the environment, then from gh's hosts.yml. None means the
/// requests go out unauthenticated.
pub fn get_token(repo: &RepoRef, config_manager: &impl ConfigManagement) -> Result<Option<String>> {
    let env_vars: &[&str] = if repo.is_github_dot_com() {
        &["GH_TOKEN", "GITHUB_TOKEN"]
    } else {
        &["GH_ENTERPRISE_TOKEN", "GITHUB_ENTERPRISE_TOKEN"]
    };
    for var in env_vars {
        if let Ok(token) = env::var(var) {
            if !token.is_empty() {
                debug!(source = var, "using token from environment");
                return Ok(Some(token));
            }
        }
    }
    let config = config_manager.load()?;
    Ok(config
        .hosts
        .get(&repo.host)
        .and_then(|entry| entry.oauth_token.clone())
        .filter(|t| !t.is_empty()))
}
