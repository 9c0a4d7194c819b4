//! Configuration for whitelist resolution and reconciliation.
//!
//! Two layers live here:
//!
//! - [`Settings`] / [`resolve_settings`]: where things are (list paths, the
//!   commit-access source, the bypass label), resolved from CLI flags, an
//!   optional TOML file and built-in defaults.
//! - [`WhitelistConfig`]: the per-run configuration the resolver and the
//!   reconciler operate on, built from resolved settings and the persisted
//!   list files.
//!
//! ## Files
//!
//! - whitelist (default `./whitelist.txt`): hand-maintained, one user per line
//! - committers (default `./committers.txt`): regenerated by `gen-committers`,
//!   used as fallback data when the live source is unavailable

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, DEFAULT_COMMITTERS, DEFAULT_OVERRIDE_LABEL, DEFAULT_WHITELIST, Resolved,
    ResolvedSettings, SourceSpec, ValueSource, parse_repo_slug, resolve_settings,
};
pub use schema::Settings;

use crate::lists::{self, ListError};
use crate::usernames::UsernameSet;
use std::path::PathBuf;
use thiserror::Error;

/// Committers compiled into the binary, used when neither the live source nor
/// the committers snapshot can supply a list.
pub const BUILTIN_COMMITTERS: &[&str] = &[];

/// Errors from reading or resolving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid repository '{0}': expected owner/name")]
    InvalidRepo(String),

    #[error("no commit-access source configured: pass --github-repo or --source-file")]
    NoSource,
}

/// Per-run whitelist configuration.
#[derive(Debug, Clone)]
pub struct WhitelistConfig {
    /// Manually curated override list
    pub whitelist_path: PathBuf,
    /// Auto-generated committers snapshot
    pub committers_path: PathBuf,
    /// Used in place of the live list when it cannot be fetched
    pub fallback_committers: Vec<String>,
    /// Always allowed, whatever the live source says
    pub additional_whitelist: UsernameSet,
    /// PR label that bypasses whitelist checks; consumed by the merge scheduler
    pub override_label: String,
}

impl WhitelistConfig {
    /// Configuration with default label, built-in fallback list and no extra users.
    pub fn new(whitelist_path: impl Into<PathBuf>, committers_path: impl Into<PathBuf>) -> Self {
        Self {
            whitelist_path: whitelist_path.into(),
            committers_path: committers_path.into(),
            fallback_committers: BUILTIN_COMMITTERS.iter().map(|s| s.to_string()).collect(),
            additional_whitelist: UsernameSet::new(),
            override_label: DEFAULT_OVERRIDE_LABEL.to_string(),
        }
    }

    /// Configuration from resolved settings, without touching the list files.
    pub fn from_settings(settings: &ResolvedSettings) -> Self {
        let mut config = Self::new(
            settings.whitelist.value.clone(),
            settings.committers.value.clone(),
        );
        config
            .fallback_committers
            .extend(settings.fallback_committers.iter().cloned());
        config
            .additional_whitelist
            .extend(settings.additional_users.iter().cloned());
        config.override_label = settings.override_label.value.clone();
        config
    }

    /// Fold the persisted lists into the configuration.
    ///
    /// Whitelist entries join the additional whitelist; committers snapshot
    /// entries join the fallback list. Missing files contribute nothing.
    pub fn with_persisted_lists(mut self) -> Result<Self, ListError> {
        let whitelisted = lists::load_if_exists(&self.whitelist_path)?;
        self.additional_whitelist.extend(whitelisted);

        let snapshot = lists::load_if_exists(&self.committers_path)?;
        for user in snapshot {
            if !self.fallback_committers.contains(&user) {
                self.fallback_committers.push(user);
            }
        }
        Ok(self)
    }
}
