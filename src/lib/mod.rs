pub mod cli_interactor;
pub mod client;
pub mod commit;
pub mod config;
pub mod git;
pub mod merge_base_next;
pub mod output;
pub mod repo_ref;
pub mod resolver;
pub mod template;
