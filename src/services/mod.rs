//! Services module - the walk, plan and apply pipeline.
//!
//! # Components
//!
//! - [`DirectoryWalker`]: lazy pre-order iterator over every directory under the
//!   library root. Siblings are yielded before any of them is descended into, so
//!   a folder renamed during the walk is not revisited under its old path.
//!
//! - [`Renamer`]: consumes the walker and, per directory, removes stale
//!   `metadata.abs` sidecars, renames book folders to their canonical name, or
//!   prunes empty folders. Tracks the rename budget and collects destination
//!   conflicts for the end-of-run report.
//!
//! - [`move_preserving_inodes`]: alternate move that hard-links each file into
//!   the destination before unlinking the original, for library software that
//!   tracks books by inode.
//!
//! # Usage Example
//!
//! ```ignore
//! use audiobook_renamer::models::RunOptions;
//! use audiobook_renamer::report::ConsoleReport;
//! use audiobook_renamer::services::Renamer;
//!
//! let options = RunOptions::new("/srv/audiobooks")
//!     .with_max_renames(-1)
//!     .with_dry_run(true);
//!
//! let summary = Renamer::new(options).run(ConsoleReport::new(None))?;
//! println!("{} folders would be renamed", summary.metrics.renamed);
//! ```

pub mod inode_move;
pub mod renamer;
pub mod walker;

pub use inode_move::{inode_of, move_preserving_inodes};
pub use renamer::{
    CONFLICTS_HEADER, DirectoryOutcome, LIMIT_REACHED_LINE, RenamePlan, Renamer, RunSummary,
};
pub use walker::{DirectoryWalker, WalkError};
