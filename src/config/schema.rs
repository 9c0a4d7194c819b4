//! TOML schema for the optional `mergegate.toml` settings file.
//!
//! ```toml
//! whitelist = "./whitelist.txt"
//! committers = "./committers.txt"
//! override_label = "ok-to-merge"
//! additional_users = ["release-bot"]
//! fallback_committers = ["alice", "bob"]
//! github_repo = "acme/widgets"
//! github_api = "https://api.github.com"
//! # source_file = "./access.txt"
//! ```
//!
//! Secrets (the GitHub token) are deliberately not part of this schema.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings read from a config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Path to the manually curated whitelist
    pub whitelist: Option<PathBuf>,
    /// Path to the generated committers snapshot
    pub committers: Option<PathBuf>,
    /// Label that lets a PR bypass the whitelist
    pub override_label: Option<String>,
    /// Users always allowed, in addition to the whitelist file
    pub additional_users: Vec<String>,
    /// Extra fallback committers, used when the live source fails
    pub fallback_committers: Vec<String>,
    /// Repository whose collaborators hold commit access, as `owner/name`
    pub github_repo: Option<String>,
    /// GitHub API root, for GitHub Enterprise
    pub github_api: Option<String>,
    /// List file to use as the commit-access source instead of GitHub
    pub source_file: Option<PathBuf>,
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            source: e,
        })
    }

    /// Read and parse a settings file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&text, path)
    }
}
