use anyhow::Result;
use rstest::rstest;
use test_utils::{fixtures, host::HostApi, *};

fn output_of(args: &[&str]) -> Result<(bool, String)> {
    let output = assert_cmd::Command::cargo_bin("gh-merge-base-next")?
        .args(args)
        .output()?;
    Ok((
        output.status.success(),
        format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        ),
    ))
}

mod help {
    use super::*;

    #[test]
    fn lists_arguments_and_flags() -> Result<()> {
        let (success, output) = output_of(&["--help"])?;
        assert!(success);
        for expected in ["gh-merge-base-next", "<base>", "<head>", "--walk-to", "--repo"] {
            assert!(output.contains(expected), "missing {expected} in {output}");
        }
        Ok(())
    }

    #[test]
    fn version_names_the_tool() -> Result<()> {
        let (success, output) = output_of(&["--version"])?;
        assert!(success);
        assert!(output.contains("gh-merge-base-next"), "{output}");
        Ok(())
    }
}

#[rstest]
#[case::no_arguments(&[])]
#[case::one_argument(&["commit1"])]
#[case::template_without_format(&["main", "feature", "--template", "{{.sha}}"])]
fn usage_errors_fail_with_usage(#[case] args: &[&str]) -> Result<()> {
    let (success, output) = output_of(args)?;
    assert!(!success);
    assert!(output.contains("Usage:"), "{output}");
    Ok(())
}

#[test]
fn unknown_walk_to_lists_possible_values() -> Result<()> {
    let (success, output) = output_of(&["main", "feature", "--walk-to", "sideways"])?;
    assert!(!success);
    assert!(output.contains("invalid value 'sideways'"), "{output}");
    assert!(output.contains("[possible values: head, base]"), "{output}");
    Ok(())
}

mod template_errors {
    use super::*;

    #[test]
    fn unclosed_action_fails_before_any_request() -> Result<()> {
        let history = fixtures::fast_forward()?;
        let api = HostApi::start(&history.repo, TEST_REPO);
        let output = merge_base_next_cmd(
            &api,
            [
                history.arg("A").as_str(),
                history.branch("feature").as_str(),
                "--format",
                "json",
                "--template",
                "{{.sha",
            ],
        )
        .output()?;
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("unclosed action"));
        Ok(())
    }
}

mod repository_from_environment {
    use super::*;

    #[test]
    fn gh_repo_is_used_without_flag() -> Result<()> {
        let history = fixtures::fast_forward()?;
        let api = HostApi::start(&history.repo, TEST_REPO);
        let output = assert_cmd::Command::cargo_bin("gh-merge-base-next")?
            .env("GITHUB_API_URL", api.url())
            .env("GH_TOKEN", TEST_TOKEN)
            .env("GH_REPO", TEST_REPO)
            .env_remove("GITHUB_ACTIONS")
            .env_remove("RUST_LOG")
            .args([history.arg("C"), history.branch("feature")])
            .output()?;
        assert!(output.status.success());
        assert_eq!(
            String::from_utf8(output.stdout)?,
            format!("{}\n", history.sha("D"))
        );
        Ok(())
    }

    #[test]
    fn git_remote_is_used_without_flag_or_env() -> Result<()> {
        let history = fixtures::fast_forward()?;
        history
            .repo
            .add_remote("origin", &format!("https://github.com/{TEST_REPO}.git"))?;
        let api = HostApi::start(&history.repo, TEST_REPO);
        let output = assert_cmd::Command::cargo_bin("gh-merge-base-next")?
            .current_dir(&history.repo.dir)
            .env("GITHUB_API_URL", api.url())
            .env("GH_TOKEN", TEST_TOKEN)
            .env_remove("GH_REPO")
            .env_remove("GH_HOST")
            .env_remove("GITHUB_ACTIONS")
            .env_remove("RUST_LOG")
            .args([history.arg("A"), history.branch("feature")])
            .output()?;
        assert!(output.status.success());
        assert_eq!(
            String::from_utf8(output.stdout)?,
            format!("{}\n", history.sha("B"))
        );
        Ok(())
    }
}
