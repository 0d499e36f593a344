use anyhow::Result;
use rstest::rstest;
use test_utils::{fixtures, *};

#[rstest]
#[case::merge_base_to_main("A", "branch:main", "head", Some("B"), 1)]
#[case::merge_base_to_feature("A", "branch:feature", "head", Some("C"), 2)]
#[case::main_to_feature_walk_to_head("branch:main", "branch:feature", "head", Some("C"), 2)]
#[case::main_to_feature_walk_to_base("branch:main", "branch:feature", "base", Some("B"), 1)]
fn simple_merge(
    #[case] base: &str,
    #[case] head: &str,
    #[case] walk_to: &str,
    #[case] expected: Option<&str>,
    #[case] depth: usize,
) -> Result<()> {
    let history = fixtures::simple_merge()?;
    assert_eq!(
        resolve_with_template(&history, base, head, walk_to),
        expected_line(&history, expected, depth)
    );
    Ok(())
}
