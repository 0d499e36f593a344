use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    client::Compare,
    commit::CommitRef,
    repo_ref::RepoRef,
    resolver::{resolve, Resolution},
};

/// Which of the two refs the walk ends at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum WalkTo {
    #[default]
    Head,
    Base,
}

impl WalkTo {
    /// `(base, head)` in the order the comparison should see them.
    pub fn order<'a>(self, base: &'a str, head: &'a str) -> (&'a str, &'a str) {
        match self {
            WalkTo::Head => (base, head),
            WalkTo::Base => (head, base),
        }
    }
}

/// The record handed to rendering. `sha` is empty and `depth` is 0 when
/// there is no next commit.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeBaseNext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitRef>,
    pub sha: String,
    pub depth: usize,
}

impl MergeBaseNext {
    pub fn is_found(&self) -> bool {
        self.commit.is_some()
    }
}

impl From<Resolution> for MergeBaseNext {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Found { commit, depth } => Self {
                sha: commit.sha.clone(),
                commit: Some(commit),
                depth,
            },
            Resolution::NotFound => Self::default(),
        }
    }
}

/// Compare the refs on the host, resolve head to a commit id and walk back to
/// the merge base's nearest first-parent descendant. Errors from `client` are
/// passed through untouched.
pub async fn get_merge_base_next<C: Compare + ?Sized>(
    client: &C,
    repo: &RepoRef,
    base: &str,
    head: &str,
    walk_to: WalkTo,
) -> Result<MergeBaseNext> {
    let (base, head) = walk_to.order(base, head);
    debug!(%repo, base, head, ?walk_to, "comparing");

    let ahead = client.compare(repo, base, head).await?;
    let head_id = client.resolve_head(repo, head).await?;

    let resolution = resolve(&ahead, &head_id);
    match &resolution {
        Resolution::Found { commit, depth } => {
            info!(sha = %commit.sha, depth, ahead = ahead.len(), "found next commit");
        }
        Resolution::NotFound if ahead.is_empty() => {
            debug!(base, head, "{head} is not ahead of {base}: no next commit");
        }
        Resolution::NotFound => {
            warn!(
                %head_id,
                ahead = ahead.len(),
                "comparison lists {} commits ahead but not {head} ({head_id}); treating as no next commit",
                ahead.len()
            );
        }
    }
    Ok(resolution.into())
}

#[cfg(test)]
mod tests {
    use anyhow::bail;
    use mockall::predicate::{always, eq};

    use super::*;
    use crate::{client::MockCompare, commit::AheadSet};

    fn repo() -> RepoRef {
        RepoRef::parse("octo/merge-base-next", "github.com").unwrap()
    }

    /// A <- B <- C <- D, branch `feature` at D
    fn fast_forward_ahead_of_a() -> AheadSet {
        AheadSet::new(vec![
            CommitRef::new("463ec54", &["476d315"]),
            CommitRef::new("f3295b2", &["463ec54"]),
            CommitRef::new("6bbcf95", &["f3295b2"]),
        ])
    }

    fn mock_with(ahead: AheadSet, head_id: &'static str) -> MockCompare {
        let mut client = MockCompare::new();
        client
            .expect_compare()
            .returning(move |_, _, _| Ok(ahead.clone()));
        client
            .expect_resolve_head()
            .returning(move |_, _| Ok(head_id.to_string()));
        client
    }

    #[tokio::test]
    async fn finds_immediate_child_of_merge_base() -> Result<()> {
        let client = mock_with(fast_forward_ahead_of_a(), "6bbcf95");
        let next =
            get_merge_base_next(&client, &repo(), "476d315", "feature", WalkTo::Head).await?;
        assert_eq!(next.sha, "463ec54");
        assert_eq!(next.depth, 3);
        assert_eq!(next.commit.map(|c| c.sha), Some("463ec54".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn empty_comparison_gives_empty_record() -> Result<()> {
        let client = mock_with(AheadSet::default(), "6bbcf95");
        let next =
            get_merge_base_next(&client, &repo(), "6bbcf95", "feature", WalkTo::Head).await?;
        assert_eq!(next, MergeBaseNext::default());
        assert!(!next.is_found());
        Ok(())
    }

    #[tokio::test]
    async fn inconsistent_comparison_gives_empty_record() -> Result<()> {
        let client = mock_with(fast_forward_ahead_of_a(), "0000000");
        let next =
            get_merge_base_next(&client, &repo(), "476d315", "feature", WalkTo::Head).await?;
        assert_eq!(next, MergeBaseNext::default());
        Ok(())
    }

    mod walk_to {
        use super::*;

        #[tokio::test]
        async fn head_keeps_argument_order() -> Result<()> {
            let mut client = MockCompare::new();
            client
                .expect_compare()
                .with(always(), eq("main"), eq("feature"))
                .times(1)
                .returning(|_, _, _| Ok(AheadSet::default()));
            client
                .expect_resolve_head()
                .with(always(), eq("feature"))
                .times(1)
                .returning(|_, _| Ok("f".to_string()));
            get_merge_base_next(&client, &repo(), "main", "feature", WalkTo::Head).await?;
            Ok(())
        }

        #[tokio::test]
        async fn base_swaps_arguments() -> Result<()> {
            let mut client = MockCompare::new();
            client
                .expect_compare()
                .with(always(), eq("feature"), eq("main"))
                .times(1)
                .returning(|_, _, _| Ok(AheadSet::default()));
            client
                .expect_resolve_head()
                .with(always(), eq("main"))
                .times(1)
                .returning(|_, _| Ok("m".to_string()));
            get_merge_base_next(&client, &repo(), "main", "feature", WalkTo::Base).await?;
            Ok(())
        }
    }

    mod collaborator_failures {
        use super::*;

        #[tokio::test]
        async fn compare_error_is_returned_unchanged() {
            let mut client = MockCompare::new();
            client.expect_compare().returning(|_, _, _| {
                bail!("GET https://api.github.com/repos/o/r/compare/x...y: 404 Not Found Not Found")
            });
            client.expect_resolve_head().never();
            let err = get_merge_base_next(&client, &repo(), "x", "y", WalkTo::Head)
                .await
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "GET https://api.github.com/repos/o/r/compare/x...y: 404 Not Found Not Found"
            );
        }

        #[tokio::test]
        async fn resolve_head_error_is_returned_unchanged() {
            let mut client = MockCompare::new();
            client
                .expect_compare()
                .returning(|_, _, _| Ok(AheadSet::default()));
            client
                .expect_resolve_head()
                .returning(|_, _| bail!("GET url: 422 Unprocessable Entity No commit found for SHA: y"));
            let err = get_merge_base_next(&client, &repo(), "x", "y", WalkTo::Head)
                .await
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "GET url: 422 Unprocessable Entity No commit found for SHA: y"
            );
        }
    }

    mod json_record {
        use super::*;

        #[test]
        fn not_found_omits_commit() -> Result<()> {
            assert_eq!(
                serde_json::to_string(&MergeBaseNext::default())?,
                r#"{"sha":"","depth":0}"#
            );
            Ok(())
        }

        #[test]
        fn found_includes_commit() -> Result<()> {
            let record = MergeBaseNext::from(Resolution::Found {
                commit: CommitRef::new("b", &["a"]),
                depth: 2,
            });
            assert_eq!(
                serde_json::to_string(&record)?,
                r#"{"commit":{"sha":"b","parents":[{"sha":"a"}]},"sha":"b","depth":2}"#
            );
            Ok(())
        }
    }
}
