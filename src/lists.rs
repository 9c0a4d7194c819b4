//! Newline-delimited username list files.
//!
//! Both the manually curated whitelist and the generated committers snapshot use
//! the same format:
//!
//! ```text
//! # auto-generated by mergegate gen-committers; manual additions should go in the whitelist
//! alice
//! bob
//! ```
//!
//! Lines starting with [`COMMENT_MARKER`] are headers and are never returned by
//! [`load`]. Empty lines are skipped as well. Every other line is returned
//! verbatim, in file order, with no trimming or validation.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// First character of a header/comment line.
pub const COMMENT_MARKER: char = '#';

/// Required permissions for list files (Unix: 0640, owner read/write, group read).
#[cfg(unix)]
pub const LIST_FILE_MODE: u32 = 0o640;

/// Errors from reading or writing a list file.
#[derive(Debug, Error)]
pub enum ListError {
    #[error("failed to read list file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write list file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ListError {
    fn read(path: &Path, source: io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    fn write(path: &Path, source: io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The underlying IO error kind.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => source.kind(),
        }
    }
}

/// Load the usernames stored in a list file.
///
/// An empty `path` means "no list configured" and yields an empty vector. A
/// path that cannot be opened is an error.
pub fn load(path: &Path) -> Result<Vec<String>, ListError> {
    if path.as_os_str().is_empty() {
        return Ok(Vec::new());
    }

    let file = File::open(path).map_err(|e| ListError::read(path, e))?;
    let mut entries = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| ListError::read(path, e))?;
        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            continue;
        }
        entries.push(line);
    }

    debug!(path = %path.display(), count = entries.len(), "loaded list file");
    Ok(entries)
}

/// Like [`load`], but a missing file is treated as an empty list.
pub fn load_if_exists(path: &Path) -> Result<Vec<String>, ListError> {
    match load(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        other => other,
    }
}

/// Replace the contents of a list file.
///
/// Writes `header` on the first line, then one item per line, then a trailing
/// newline. The data is written to a temporary file next to `path`, synced and
/// renamed into place, so readers see either the old file or the new one. The
/// parent directory must already exist.
///
/// An existing target must be writable by the caller. A symlinked target is
/// followed: the file it points at is replaced and the link is left in place.
pub fn save<S: AsRef<str>>(path: &Path, header: &str, items: &[S]) -> Result<(), ListError> {
    let target = resolve_target(path)?;
    if target.exists() {
        OpenOptions::new()
            .write(true)
            .open(&target)
            .map_err(|e| ListError::write(path, e))?;
    }

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut contents = String::with_capacity(header.len() + 1 + items.len() * 16);
    contents.push_str(header);
    contents.push('\n');
    for item in items {
        contents.push_str(item.as_ref());
        contents.push('\n');
    }

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| ListError::write(path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(LIST_FILE_MODE))
            .map_err(|e| ListError::write(path, e))?;
    }

    temp.as_file_mut()
        .write_all(contents.as_bytes())
        .map_err(|e| ListError::write(path, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| ListError::write(path, e))?;
    temp.persist(&target)
        .map_err(|e| ListError::write(path, e.error))?;

    debug!(path = %path.display(), count = items.len(), "wrote list file");
    Ok(())
}

/// The file a save to `path` should replace.
fn resolve_target(path: &Path) -> Result<PathBuf, ListError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => match fs::canonicalize(path) {
            Ok(resolved) => Ok(resolved),
            // Dangling link: create the file it names.
            Err(_) => {
                let link = fs::read_link(path).map_err(|e| ListError::write(path, e))?;
                Ok(match path.parent() {
                    Some(parent) => parent.join(link),
                    None => link,
                })
            }
        },
        _ => Ok(path.to_path_buf()),
    }
}
