use std::{env::current_dir, fs, path::PathBuf};

use anyhow::{Context, Result};
use git2::{Oid, RepositoryInitOptions, Signature, Time};

pub struct GitTestRepo {
    pub dir: PathBuf,
    pub git_repo: git2::Repository,
}

impl Default for GitTestRepo {
    fn default() -> Self {
        Self::new("main").unwrap()
    }
}

impl GitTestRepo {
    pub fn new(main_branch_name: &str) -> Result<Self> {
        let path = current_dir()?.join(format!("tmpgit-{}", rand::random::<u64>()));
        let git_repo = git2::Repository::init_opts(
            &path,
            RepositoryInitOptions::new()
                .initial_head(main_branch_name)
                .mkpath(true),
        )?;
        Ok(Self {
            dir: path,
            git_repo,
        })
    }

    /// Commit an empty tree on top of `parents` without moving any reference.
    ///
    /// Commits are a second apart so the history has a stable date order.
    pub fn commit(&self, message: &str, parents: &[Oid]) -> Result<Oid> {
        let tree_oid = self.git_repo.treebuilder(None)?.write()?;
        let tree = self.git_repo.find_tree(tree_oid)?;
        let parents = parents
            .iter()
            .map(|oid| self.git_repo.find_commit(*oid))
            .collect::<Result<Vec<_>, _>>()?;
        let seconds = parents
            .iter()
            .map(|p| p.time().seconds() + 1)
            .max()
            .unwrap_or(0);
        let signature = joe_signature_at(seconds);
        let oid = self.git_repo.commit(
            None,
            &signature,
            &signature,
            message,
            &tree,
            &parents.iter().collect::<Vec<_>>(),
        )?;
        Ok(oid)
    }

    /// Point local branch `branch_name` at `oid`, creating it if needed.
    pub fn set_branch(&self, branch_name: &str, oid: Oid) -> Result<()> {
        let commit = self.git_repo.find_commit(oid)?;
        self.git_repo
            .branch(branch_name, &commit, true)
            .context(format!("could not set branch {branch_name}"))?;
        Ok(())
    }

    pub fn get_tip_of_local_branch(&self, branch_name: &str) -> Result<Oid> {
        let branch = self
            .git_repo
            .find_branch(branch_name, git2::BranchType::Local)
            .context(format!("cannot find branch {branch_name}"))?;
        Ok(branch.into_reference().peel_to_commit()?.id())
    }

    pub fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.git_repo.remote(name, url)?;
        Ok(())
    }
}

impl Drop for GitTestRepo {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

pub fn joe_signature_at(seconds: i64) -> Signature<'static> {
    Signature::new("Joe Bloggs", "joe.bloggs@pm.me", &Time::new(seconds, 0)).unwrap()
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn commit_links_parents_without_moving_head() -> Result<()> {
        let repo = GitTestRepo::default();
        let a = repo.commit("A", &[])?;
        let b = repo.commit("B", &[a])?;
        let c = repo.commit("C", &[a])?;
        let merge = repo.commit("merge", &[b, c])?;
        repo.set_branch("feature", merge)?;

        let commit = repo.git_repo.find_commit(merge)?;
        assert_eq!(commit.parent_ids().collect::<Vec<_>>(), vec![b, c]);
        assert_eq!(repo.get_tip_of_local_branch("feature")?, merge);
        assert!(repo.git_repo.head().is_err());
        Ok(())
    }

    #[test]
    fn dropping_removes_the_repository_dir() -> Result<()> {
        let repo = GitTestRepo::default();
        let dir = repo.dir.clone();
        assert!(dir.exists());
        drop(repo);
        assert!(!dir.exists());
        Ok(())
    }
}
