#![cfg_attr(not(test), warn(clippy::pedantic))]
#![cfg_attr(not(test), warn(clippy::expect_used))]

use clap::Parser;
use cli::Cli;
use merge_base_next::cli_interactor::{error_prefix, CliError};

mod cli;
mod launch;
mod logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::setup_tracing(cli.verbose);

    if let Err(err) = launch::launch(&cli).await {
        if err.downcast_ref::<CliError>().is_some() {
            // Already printed styled output to stderr
            std::process::exit(1);
        }
        eprintln!("{}{err:?}", error_prefix());
        std::process::exit(1);
    }
}
