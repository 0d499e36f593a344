//! Commit graphs the integration tests resolve against.
//!
//! Each history lives in its own repository with branches named
//! `testdata/<scenario>/<branch>`. Commits are addressed by their one or two
//! letter label.

use std::collections::HashMap;

use anyhow::{Context, Result};
use git2::Oid;

use crate::git::GitTestRepo;

pub struct History {
    pub repo: GitTestRepo,
    pub scenario: &'static str,
    commits: HashMap<&'static str, Oid>,
}

impl History {
    /// Commits are created in order, so parents must be listed before their
    /// children. The first parent listed is the first parent recorded.
    pub fn build(
        scenario: &'static str,
        commits: &[(&'static str, &[&'static str])],
        branches: &[(&str, &'static str)],
    ) -> Result<Self> {
        let repo = GitTestRepo::new("main")?;
        let mut oids = HashMap::new();
        for (label, parents) in commits {
            let parents = parents
                .iter()
                .map(|p| {
                    oids.get(p)
                        .copied()
                        .context(format!("{p} must be committed before {label}"))
                })
                .collect::<Result<Vec<Oid>>>()?;
            let oid = repo.commit(&format!("{label}: {scenario}"), &parents)?;
            oids.insert(*label, oid);
        }
        let history = Self {
            repo,
            scenario,
            commits: oids,
        };
        for (branch, label) in branches {
            history
                .repo
                .set_branch(&history.branch(branch), history.oid(label))?;
        }
        Ok(history)
    }

    pub fn oid(&self, label: &str) -> Oid {
        *self
            .commits
            .get(label)
            .unwrap_or_else(|| panic!("no commit labelled {label} in {}", self.scenario))
    }

    pub fn sha(&self, label: &str) -> String {
        self.oid(label).to_string()
    }

    pub fn short_sha(&self, label: &str) -> String {
        self.sha(label)[..7].to_string()
    }

    /// Full branch name, eg. `testdata/fast-forward/main`.
    pub fn branch(&self, name: &str) -> String {
        format!("testdata/{}/{name}", self.scenario)
    }

    /// Resolve a test case argument: a commit label, a branch under this
    /// scenario, or anything else passed through as is.
    pub fn arg(&self, value: &str) -> String {
        if self.commits.contains_key(value) {
            self.short_sha(value)
        } else if let Some(name) = value.strip_prefix("branch:") {
            self.branch(name)
        } else {
            value.to_string()
        }
    }
}

/// ```text
/// * D (feature)
/// * C
/// * B
/// * A (main)
/// ```
pub fn fast_forward() -> Result<History> {
    History::build(
        "fast-forward",
        &[("A", &[]), ("B", &["A"]), ("C", &["B"]), ("D", &["C"])],
        &[("main", "A"), ("feature", "D")],
    )
}

/// ```text
/// * B (main)
/// | * D (feature)
/// | * C
/// |/
/// * A
/// ```
pub fn simple_merge() -> Result<History> {
    History::build(
        "simple-merge",
        &[("A", &[]), ("B", &["A"]), ("C", &["A"]), ("D", &["C"])],
        &[("main", "B"), ("feature", "D")],
    )
}

/// ```text
/// * G (main)
/// * E merge of B into D
/// |\
/// * | D
/// | * B (feature1)
/// |/
/// | * F (feature2)
/// | * C
/// |/
/// * A
/// ```
pub fn complex_merge() -> Result<History> {
    History::build(
        "complex-merge",
        &[
            ("A", &[]),
            ("B", &["A"]),
            ("C", &["A"]),
            ("D", &["A"]),
            ("E", &["D", "B"]),
            ("F", &["C"]),
            ("G", &["E"]),
        ],
        &[("main", "G"), ("feature1", "B"), ("feature2", "F")],
    )
}

/// Two branches that each merged the other, giving two merge bases.
///
/// ```text
/// * G (branch1)       * I (branch2)
/// * F merge D, E      * H merge E, D
/// D (branchA) <- B <- A -> C -> E (branchB)
/// ```
pub fn multiple_merge_base() -> Result<History> {
    History::build(
        "multiple-merge-base",
        &[
            ("A", &[]),
            ("B", &["A"]),
            ("C", &["A"]),
            ("D", &["B"]),
            ("E", &["C"]),
            ("F", &["D", "E"]),
            ("G", &["F"]),
            ("H", &["E", "D"]),
            ("I", &["H"]),
        ],
        &[
            ("branchA", "D"),
            ("branchB", "E"),
            ("branch1", "G"),
            ("branch2", "I"),
        ],
    )
}

/// ```text
/// *   M2 (feature1) merge F2 into F1
/// |\
/// | * F2 (feature2)
/// | *   G merge B into C
/// | |\
/// | * | C (main)
/// * | | F1
/// | |/
/// |/|
/// * | B
/// |/
/// * A
/// ```
pub fn cross_merge() -> Result<History> {
    History::build(
        "cross-merge",
        &[
            ("A", &[]),
            ("B", &["A"]),
            ("C", &["A"]),
            ("G", &["C", "B"]),
            ("F1", &["B"]),
            ("F2", &["G"]),
            ("M2", &["F1", "F2"]),
        ],
        &[("main", "C"), ("feature1", "M2"), ("feature2", "F2")],
    )
}

/// A small history plus an unrelated root on `orphan`.
pub fn error_cases() -> Result<History> {
    History::build(
        "error-cases",
        &[("A", &[]), ("B", &["A"]), ("O", &[])],
        &[("main", "A"), ("feature", "B"), ("orphan", "O")],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branches_point_at_labelled_commits() -> Result<()> {
        let history = complex_merge()?;
        assert_eq!(
            history
                .repo
                .get_tip_of_local_branch("testdata/complex-merge/main")?,
            history.oid("G")
        );
        let e = history.repo.git_repo.find_commit(history.oid("E"))?;
        assert_eq!(
            e.parent_ids().collect::<Vec<_>>(),
            vec![history.oid("D"), history.oid("B")]
        );
        Ok(())
    }

    #[test]
    fn arg_expands_labels_and_branches() -> Result<()> {
        let history = fast_forward()?;
        assert_eq!(history.arg("A"), history.short_sha("A"));
        assert_eq!(history.arg("branch:feature"), "testdata/fast-forward/feature");
        assert_eq!(history.arg("invalidsha"), "invalidsha");
        Ok(())
    }
}
