//! CLI argument definitions for Mergegate.

use crate::config::ConfigOverrides;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Version string including the git commit the binary was built from.
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("MERGEGATE_GIT_COMMIT"),
    " ",
    env!("MERGEGATE_BUILD_TIMESTAMP"),
    ")"
);

/// Mergegate - who may auto-merge through the merge queue.
///
/// Run `mergegate gen-committers` periodically to refresh the committers
/// snapshot and prune the whitelist.
#[derive(Parser, Debug)]
#[command(name = "mergegate")]
#[command(author, version = VERSION, about = "Resolve and reconcile the merge-queue whitelist", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Settings file (TOML)
    #[arg(long, global = true, env = "MERGEGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to a whitelist file that contains users to auto-merge
    #[arg(long = "user-whitelist", global = true)]
    pub whitelist: Option<PathBuf>,

    /// File in which the list of authorized committers is stored; used when
    /// the list cannot be fetched at run time
    #[arg(long, global = true)]
    pub committers: Option<PathBuf>,

    /// Label that, if present on a PR, merges it even if the author isn't whitelisted
    #[arg(long = "whitelist-override-label", global = true)]
    pub override_label: Option<String>,

    /// Additional user to always allow (repeatable)
    #[arg(long = "additional-user", global = true)]
    pub additional_users: Vec<String>,

    /// GitHub repository (owner/name) whose push collaborators have commit access
    #[arg(long, global = true)]
    pub github_repo: Option<String>,

    /// GitHub API root, for GitHub Enterprise
    #[arg(long, global = true)]
    pub github_api: Option<String>,

    /// GitHub token used to list collaborators
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Read the commit-access list from this file instead of GitHub
    #[arg(long, global = true)]
    pub source_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Settings given on the command line.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            whitelist: self.whitelist.clone(),
            committers: self.committers.clone(),
            override_label: self.override_label.clone(),
            additional_users: self.additional_users.clone(),
            github_repo: self.github_repo.clone(),
            github_api: self.github_api.clone(),
            github_token: self.github_token.clone(),
            source_file: self.source_file.clone(),
        }
    }
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the list of people with commit access and de-dup the whitelist
    #[command(name = "gen-committers", alias = "gencommiters")]
    GenCommitters {
        /// Show what would change without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the effective list of users allowed to auto-merge
    Whitelist,

    /// Check whether a user may auto-merge
    Check {
        /// Username to check
        user: String,
    },
}
