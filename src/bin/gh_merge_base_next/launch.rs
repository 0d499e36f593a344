use std::env;

use anyhow::{Context, Result};
use merge_base_next::{
    cli_interactor::cli_error,
    client::{Client, Params},
    config::{default_host, ConfigManager},
    git::{Repo, RepoActions},
    merge_base_next::get_merge_base_next,
    output::Renderer,
    repo_ref::RepoRef,
};

use crate::cli::Cli;

pub async fn launch(cli: &Cli) -> Result<()> {
    let renderer = Renderer::new(cli.format, cli.template.as_deref())?;
    let repo = get_repo_ref(cli)?;

    let client = Client::new(Params::for_repo(&repo, &ConfigManager::default())?)?;

    let next = get_merge_base_next(&client, &repo, &cli.base, &cli.head, cli.walk_to).await?;

    print!("{}", renderer.render(&next)?);
    Ok(())
}

/// `--repo`, then `GH_REPO`, then the remotes of the git repository we are in.
fn get_repo_ref(cli: &Cli) -> Result<RepoRef> {
    let default_host = default_host();
    if let Some(repo) = &cli.repo {
        return RepoRef::parse(repo, &default_host);
    }
    if let Ok(repo) = env::var("GH_REPO") {
        if !repo.is_empty() {
            return RepoRef::parse(&repo, &default_host).context("GH_REPO is not valid");
        }
    }
    if let Ok(git_repo) = Repo::discover() {
        if let Some(repo_ref) = git_repo.get_hosted_repo_ref()? {
            return Ok(repo_ref);
        }
    }
    Err(cli_error(
        "could not determine the repository to compare in",
        &[
            ("--repo", "pass [HOST/]OWNER/REPO"),
            ("GH_REPO", "or set it in the environment"),
        ],
        &["gh merge-base-next --repo OWNER/REPO <base> <head>"],
    ))
}
