use std::ffi::OsStr;

use fixtures::History;
use host::HostApi;

pub mod fixtures;
pub mod git;
pub mod host;

pub static TEST_REPO: &str = "octo/merge-base-next-testdata";
pub static TEST_TOKEN: &str = "lkjh2398HLKJ43hrweiJ6FaPfdssgtrg";
/// renders the resolved sha and depth on one line, `<no value>` when nothing
/// was found
pub static SHA_AND_DEPTH_TEMPLATE: &str = "{{.commit.sha}} depth:{{.depth}}";

/// `gh-merge-base-next` isolated from the caller's environment and pointed at
/// `api`.
pub fn merge_base_next_cmd<I, S>(api: &HostApi, args: I) -> assert_cmd::Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = assert_cmd::Command::cargo_bin("gh-merge-base-next").unwrap();
    for var in [
        "GH_REPO",
        "GH_HOST",
        "GITHUB_TOKEN",
        "GITHUB_ACTIONS",
        "RUNNER_DEBUG",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("GITHUB_API_URL", api.url())
        .env("GH_TOKEN", TEST_TOKEN)
        .env("GH_CONFIG_DIR", std::env::temp_dir().join("gh-merge-base-next-none"))
        .env("RUST_BACKTRACE", "0")
        .arg("--repo")
        .arg(TEST_REPO)
        .args(args);
    cmd
}

/// Serve `history` and run the resolver on `base` and `head`, rendering with
/// [`SHA_AND_DEPTH_TEMPLATE`]. Returns trimmed stdout.
pub fn resolve_with_template(history: &History, base: &str, head: &str, walk_to: &str) -> String {
    let api = HostApi::start(&history.repo, TEST_REPO);
    let output = merge_base_next_cmd(
        &api,
        [
            history.arg(base).as_str(),
            history.arg(head).as_str(),
            "--walk-to",
            walk_to,
            "--format",
            "json",
            "--template",
            SHA_AND_DEPTH_TEMPLATE,
        ],
    )
    .assert()
    .success()
    .get_output()
    .stdout
    .clone();
    String::from_utf8(output).unwrap().trim().to_string()
}

/// What [`SHA_AND_DEPTH_TEMPLATE`] renders for `label` at `depth`, or for no
/// commit when `label` is `None`.
pub fn expected_line(history: &History, label: Option<&str>, depth: usize) -> String {
    match label {
        Some(label) => format!("{} depth:{depth}", history.sha(label)),
        None => format!("<no value> depth:{depth}"),
    }
}
