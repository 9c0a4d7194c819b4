//! Committers snapshot regeneration and whitelist de-duplication.
//!
//! [`reconcile`] runs two phases, in order:
//!
//! 1. **Snapshot**: fetch the commit-access list and overwrite the committers
//!    file with it.
//! 2. **De-duplication**: drop whitelist entries that are committers (they are
//!    already authorized) or repeats of an earlier line, then rewrite the
//!    whitelist.
//!
//! Any failure aborts the run. Phase 2 only starts once phase 1 has persisted,
//! and its redundancy test uses the list phase 1 just fetched.
//!
//! Runs are serialized by an advisory lock on `<committers>.lock`.

use crate::config::WhitelistConfig;
use crate::lists::{self, ListError};
use crate::source::{CommitAccessSource, SourceError};
use crate::usernames::UsernameSet;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Name of the maintenance subcommand, as recorded in generated headers.
pub const GEN_COMMITTERS_COMMAND: &str = "gen-committers";

/// Errors that abort a reconciliation run. Each names the phase that failed.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("another gen-committers run holds {path}: {source}")]
    Locked {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to lock {path}: {source}")]
    LockFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("snapshot phase: unable to read committers from {from}: {source}")]
    Fetch {
        from: String,
        #[source]
        source: SourceError,
    },

    #[error("snapshot phase: unable to write committers: {0}")]
    WriteCommitters(#[source] ListError),

    #[error("de-duplication phase: error loading whitelist; it will not be updated: {0}")]
    LoadWhitelist(#[source] ListError),

    #[error("de-duplication phase: unable to write de-duped whitelist: {0}")]
    WriteWhitelist(#[source] ListError),
}

/// Options for a reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Program name written into file headers
    pub program: String,
    /// Compute the result without writing files or taking the lock
    pub dry_run: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            program: env!("CARGO_PKG_NAME").to_string(),
            dry_run: false,
        }
    }
}

/// Outcome of a reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    /// Description of the commit-access source
    pub source: String,
    pub committers_path: PathBuf,
    pub whitelist_path: PathBuf,
    /// Number of committers written to the snapshot
    pub committers: usize,
    /// Whitelist entries kept, in file order
    pub kept: Vec<String>,
    /// Whitelist entries dropped as committers or duplicates, in file order
    pub removed: Vec<String>,
    pub dry_run: bool,
    pub completed_at: DateTime<Utc>,
}

/// Header written to the committers snapshot.
pub fn committers_header(program: &str) -> String {
    format!(
        "# auto-generated by {} {}; manual additions should go in the whitelist",
        program, GEN_COMMITTERS_COMMAND
    )
}

/// Header written to the de-duplicated whitelist.
pub fn whitelist_header(program: &str) -> String {
    format!("# remove dups with {} {}", program, GEN_COMMITTERS_COMMAND)
}

/// Split whitelist entries into (kept, removed).
///
/// An entry is removed if it is a committer or has already been kept.
pub fn dedup_whitelist(
    committers: &UsernameSet,
    whitelist: Vec<String>,
) -> (Vec<String>, Vec<String>) {
    let mut seen = committers.clone();
    let mut kept = Vec::new();
    let mut removed = Vec::new();
    for user in whitelist {
        if seen.contains(&user) {
            info!(user = %user, "{} is a dup, or already a committer. Will remove from whitelist.", user);
            removed.push(user);
            continue;
        }
        seen.insert(user.clone());
        kept.push(user);
    }
    (kept, removed)
}

/// Exclusive lock held for the duration of a run.
struct RunLock {
    _file: File,
}

impl RunLock {
    fn path_for(committers_path: &Path) -> PathBuf {
        let mut path = committers_path.as_os_str().to_owned();
        path.push(".lock");
        PathBuf::from(path)
    }

    fn acquire(committers_path: &Path) -> Result<Self, ReconcileError> {
        let path = Self::path_for(committers_path);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| ReconcileError::LockFile {
                path: path.clone(),
                source,
            })?;
        if let Err(source) = file.try_lock_exclusive() {
            return Err(if source.kind() == fs2::lock_contended_error().kind() {
                ReconcileError::Locked { path, source }
            } else {
                ReconcileError::LockFile { path, source }
            });
        }
        Ok(Self { _file: file })
    }
}

/// Regenerate the committers snapshot and de-duplicate the whitelist.
pub fn reconcile(
    config: &WhitelistConfig,
    source: &dyn CommitAccessSource,
    options: &ReconcileOptions,
) -> Result<ReconcileReport, ReconcileError> {
    let _lock = if options.dry_run {
        None
    } else {
        Some(RunLock::acquire(&config.committers_path)?)
    };

    // Snapshot phase
    let fetched = source
        .users_with_commit_access()
        .map_err(|e| ReconcileError::Fetch {
            from: source.describe(),
            source: e,
        })?;
    if !options.dry_run {
        lists::save(
            &config.committers_path,
            &committers_header(&options.program),
            &fetched,
        )
        .map_err(ReconcileError::WriteCommitters)?;
        info!(path = %config.committers_path.display(), count = fetched.len(), "Successfully updated committers file.");
    }

    // De-duplication phase
    let whitelist =
        lists::load_if_exists(&config.whitelist_path).map_err(ReconcileError::LoadWhitelist)?;
    let committers: UsernameSet = fetched.iter().cloned().collect();
    let (kept, removed) = dedup_whitelist(&committers, whitelist);
    if !options.dry_run {
        lists::save(
            &config.whitelist_path,
            &whitelist_header(&options.program),
            &kept,
        )
        .map_err(ReconcileError::WriteWhitelist)?;
        info!(path = %config.whitelist_path.display(), removed = removed.len(), "Successfully de-duped whitelist.");
    }

    Ok(ReconcileReport {
        source: source.describe(),
        committers_path: config.committers_path.clone(),
        whitelist_path: config.whitelist_path.clone(),
        committers: fetched.len(),
        kept,
        removed,
        dry_run: options.dry_run,
        completed_at: Utc::now(),
    })
}
