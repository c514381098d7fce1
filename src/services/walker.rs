//! Directory tree walker.
//!
//! Yields every directory below a root (the root itself excluded), parents
//! before children, siblings in file-name order.
//!
//! A directory's own subdirectories are listed only when the walk descends
//! into it, which happens after all of its siblings have been yielded. A
//! directory that the caller renamed or removed in the meantime is therefore
//! skipped instead of being revisited under a path that no longer exists.
//!
//! ```ignore
//! use audiobook_renamer::services::DirectoryWalker;
//!
//! for dir in DirectoryWalker::new("/srv/audiobooks")? {
//!     let dir = dir?;
//!     println!("{}", dir);
//! }
//! ```

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::VecDeque;
use std::io::ErrorKind;
use thiserror::Error;
use walkdir::WalkDir;

/// Errors detected before the walk starts
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Root folder {0} does not exist")]
    RootNotFound(Utf8PathBuf),

    #[error("Root folder {0} is not a directory")]
    NotADirectory(Utf8PathBuf),
}

/// One directory level: subdirectories still to yield, then those to descend into.
#[derive(Debug)]
struct Level {
    pending: std::vec::IntoIter<Utf8PathBuf>,
    yielded: VecDeque<Utf8PathBuf>,
}

impl Level {
    fn new(children: Vec<Utf8PathBuf>) -> Self {
        Self {
            pending: children.into_iter(),
            yielded: VecDeque::new(),
        }
    }
}

/// Lazy pre-order iterator over the directories under a root.
#[derive(Debug)]
pub struct DirectoryWalker {
    stack: Vec<Level>,
}

impl DirectoryWalker {
    /// Start a walk at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError`] if `root` is missing or not a directory, or an I/O
    /// error if it cannot be listed.
    pub fn new(root: impl AsRef<Utf8Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            return Err(WalkError::RootNotFound(root).into());
        }
        if !root.is_dir() {
            return Err(WalkError::NotADirectory(root).into());
        }

        let children = list_subdirectories(&root)?.unwrap_or_default();

        Ok(Self {
            stack: vec![Level::new(children)],
        })
    }

    /// Do not descend into `dir`, the most recently yielded directory or one
    /// of its siblings. Used after a directory has been moved or removed (or
    /// would have been, in a dry run).
    pub fn skip_descendants(&mut self, dir: &Utf8Path) {
        if let Some(level) = self.stack.last_mut() {
            level.yielded.retain(|yielded| yielded.as_path() != dir);
        }
    }
}

impl Iterator for DirectoryWalker {
    type Item = Result<Utf8PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;

            if let Some(dir) = level.pending.next() {
                level.yielded.push_back(dir.clone());
                return Some(Ok(dir));
            }

            if let Some(dir) = level.yielded.pop_front() {
                match list_subdirectories(&dir) {
                    Ok(Some(children)) => {
                        if !children.is_empty() {
                            self.stack.push(Level::new(children));
                        }
                    }
                    Ok(None) => tracing::debug!("Not descending into {}: no longer exists", dir),
                    Err(e) => return Some(Err(e)),
                }
                continue;
            }

            self.stack.pop();
        }
    }
}

/// List the immediate subdirectories of `dir`, sorted by name.
///
/// Returns `Ok(None)` if `dir` itself has vanished. Symlinks are not followed
/// and names that are not valid UTF-8 are skipped.
fn list_subdirectories(dir: &Utf8Path) -> Result<Option<Vec<Utf8PathBuf>>> {
    let mut children = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err)
                if err.depth() == 0
                    && err.io_error().map(|e| e.kind()) == Some(ErrorKind::NotFound) =>
            {
                return Ok(None);
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to list directory: {}", dir));
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        match Utf8PathBuf::from_path_buf(entry.into_path()) {
            Ok(path) => children.push(path),
            Err(path) => tracing::warn!("Skipping directory with non UTF-8 name: {}", path.display()),
        }
    }

    Ok(Some(children))
}
