use clap::Parser;
use merge_base_next::{merge_base_next::WalkTo, output::Format};

#[derive(Parser)]
#[command(
    name = "gh-merge-base-next",
    author,
    version,
    about = "find the commit after the merge base of <base> and <head>",
    long_about = "find the commit after the merge base of <base> and <head>\n\nwalks <head>'s first-parent line back toward the merge base the host computes for the two refs and prints the first commit after it, with the number of first-parent hops from <head> (inclusive) as depth."
)]
pub struct Cli {
    /// base branch, tag or commit
    #[arg(value_name = "base")]
    pub base: String,
    /// head branch, tag or commit
    #[arg(value_name = "head")]
    pub head: String,
    /// select another repository using the [HOST/]OWNER/REPO format
    #[arg(short = 'R', long, value_name = "[HOST/]OWNER/REPO")]
    pub repo: Option<String>,
    /// walk from base toward head, or from head toward base
    #[arg(long, value_enum, default_value_t = WalkTo::Head)]
    pub walk_to: WalkTo,
    /// output format
    #[arg(long, value_enum)]
    pub format: Option<Format>,
    /// format JSON output using a Go template, eg. '{{.sha}} {{.depth}}'
    #[arg(short, long, requires = "format")]
    pub template: Option<String>,
    /// increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
