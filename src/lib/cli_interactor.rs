use std::{env, fmt};

use console::Style;

/// Sentinel error type indicating the error has already been printed to stderr.
///
/// When this propagates up to `main()`, it signals "already printed styled
/// output to stderr, don't double-print".
#[derive(Debug)]
pub struct CliError;

impl fmt::Display for CliError {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}

impl std::error::Error for CliError {}

/// True inside a GitHub Actions job, where errors are reported with workflow
/// commands.
pub fn is_github_actions() -> bool {
    env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}

/// `::error::` inside GitHub Actions, `Error: ` everywhere else.
pub fn error_prefix() -> &'static str {
    if is_github_actions() {
        "::error::"
    } else {
        "Error: "
    }
}

/// Print a styled CLI error to stderr and return an `anyhow::Error` wrapping
/// [`CliError`].
///
/// - `message`: the main error text
/// - `details`: flag/description pairs shown as gray indented lines,
///   descriptions aligned to the longest flag
/// - `suggestions`: command suggestions shown in yellow
pub fn cli_error(message: &str, details: &[(&str, &str)], suggestions: &[&str]) -> anyhow::Error {
    let dim = Style::new().for_stderr().color256(247);

    if is_github_actions() {
        eprintln!("::error::{message}");
    } else {
        eprintln!(
            "{} {}",
            console::style("error:").for_stderr().red(),
            message
        );
    }

    let max_flag_len = details
        .iter()
        .map(|(flag, _)| flag.len())
        .max()
        .unwrap_or(0);
    for (flag, desc) in details {
        eprintln!(
            "  {:width$}  {}",
            dim.apply_to(flag),
            dim.apply_to(desc),
            width = max_flag_len
        );
    }

    if !suggestions.is_empty() {
        eprintln!();
        for cmd in suggestions {
            eprintln!(
                "{}",
                console::style(format!("    {cmd}")).for_stderr().yellow(),
            );
        }
    }

    CliError.into()
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn prefix_outside_actions() {
        env::remove_var("GITHUB_ACTIONS");
        assert_eq!(error_prefix(), "Error: ");
    }

    #[test]
    #[serial]
    fn prefix_inside_actions() {
        env::set_var("GITHUB_ACTIONS", "true");
        let prefix = error_prefix();
        env::remove_var("GITHUB_ACTIONS");
        assert_eq!(prefix, "::error::");
    }

    #[test]
    fn cli_error_is_downcastable() {
        let err = cli_error("no repository", &[("--repo", "OWNER/REPO")], &[]);
        assert!(err.downcast_ref::<CliError>().is_some());
        assert_eq!(err.to_string(), "");
    }
}
