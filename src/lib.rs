//! Mergegate - decides who may auto-merge through a merge queue.
//!
//! The effective allow-set combines a hand-maintained whitelist with the list
//! of users holding commit access, fetched live from the source-control host.
//! When the live list is unavailable a committers snapshot (regenerated by
//! `mergegate gen-committers`) stands in for it.

pub mod cli;
pub mod commands;
pub mod config;
pub mod lists;
pub mod reconcile;
pub mod resolver;
pub mod source;
pub mod usernames;

pub use config::WhitelistConfig;
pub use reconcile::{ReconcileError, ReconcileOptions, ReconcileReport, reconcile};
pub use resolver::{AllowSource, Resolution, refresh};
pub use source::{CommitAccessSource, GitHubSource, ListFileSource, SourceError};
pub use usernames::UsernameSet;

/// Library-level error type for Mergegate operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    List(#[from] lists::ListError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

/// Result type alias for Mergegate operations.
pub type Result<T> = std::result::Result<T, Error>;
