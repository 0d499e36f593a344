use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A commit as the host reports it. Only the id and the ordered parents are
/// read here; every other field the host sends is kept in `extra` and
/// rendered back out as is.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CommitRef {
    pub sha: String,
    #[serde(default)]
    pub parents: Vec<ParentRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ParentRef {
    pub sha: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CommitRef {
    /// Bare commit with no payload. Mostly useful to build graphs by hand.
    pub fn new(sha: &str, parents: &[&str]) -> Self {
        Self {
            sha: sha.to_string(),
            parents: parents
                .iter()
                .map(|p| ParentRef {
                    sha: p.to_string(),
                    extra: Map::new(),
                })
                .collect(),
            extra: Map::new(),
        }
    }

    pub fn first_parent(&self) -> Option<&str> {
        self.parents.first().map(|p| p.sha.as_str())
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// Commits reachable from `head` but not from `base`, as decided by the host.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AheadSet {
    commits: Vec<CommitRef>,
}

impl AheadSet {
    pub fn new(commits: Vec<CommitRef>) -> Self {
        Self { commits }
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn commits(&self) -> &[CommitRef] {
        &self.commits
    }

    /// id -> commit. When an id appears twice the last occurrence is kept.
    pub fn index(&self) -> HashMap<&str, &CommitRef> {
        self.commits.iter().map(|c| (c.sha.as_str(), c)).collect()
    }
}

impl FromIterator<CommitRef> for AheadSet {
    fn from_iter<I: IntoIterator<Item = CommitRef>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
