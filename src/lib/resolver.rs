use tracing::trace;

use crate::commit::{AheadSet, CommitRef};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// `commit` is the merge base's nearest descendant on head's first-parent
    /// line, `depth` first-parent hops from head counting both ends (head
    /// itself is depth 1).
    Found { commit: CommitRef, depth: usize },
    /// head is not in the ahead set: no divergence, or an inconsistent
    /// comparison.
    NotFound,
}

/// Walk first-parent links from `head_id` until the next parent falls outside
/// `ahead`. Second and later parents of merge commits are never followed.
pub fn resolve(ahead: &AheadSet, head_id: &str) -> Resolution {
    let index = ahead.index();
    let Some(mut current) = index.get(head_id).copied() else {
        return Resolution::NotFound;
    };
    let mut depth = 1;

    // a well formed ahead set is acyclic so this bound is never the reason to
    // stop
    while depth < ahead.len() {
        let Some(parent_id) = current.first_parent() else {
            break;
        };
        match index.get(parent_id) {
            Some(parent) => {
                trace!(from = %current.sha, to = %parent.sha, depth, "first-parent hop");
                current = parent;
                depth += 1;
            }
            None => break,
        }
    }

    Resolution::Found {
        commit: current.clone(),
        depth,
    }
}
