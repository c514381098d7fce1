use crate::metrics::RunMetrics;
use crate::models::{AudiobookRecord, CanonicalName, MoveStrategy, RunOptions};
use crate::report::ReportSink;
use crate::services::inode_move::move_preserving_inodes;
use crate::services::walker::DirectoryWalker;
use crate::state::{ConflictRecord, RenameBudget, RunState};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::ffi::OsStr;
use std::fs;

/// Report line emitted when the rename budget runs out
pub const LIMIT_REACHED_LINE: &str = "Hit Max Rename Limit";

/// Header of the conflict list at the end of a run
pub const CONFLICTS_HEADER: &str = "There are duplicate audiobooks:";

/// Where a book folder should go, computed from its metadata record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    /// The folder as found by the walker
    pub source: Utf8PathBuf,
    /// Sibling of `source` carrying the flattened canonical name
    pub target: Utf8PathBuf,
    /// Nested `root/Authors/Series` location; informational only, folders are
    /// never moved there
    pub library_path: Utf8PathBuf,
    pub name: CanonicalName,
}

impl RenamePlan {
    pub fn is_canonical(&self) -> bool {
        self.source == self.target
    }
}

/// What processing did to a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryOutcome {
    /// Left in place (possibly after sidecar cleanup)
    Kept,
    /// Moved to its canonical name
    Moved,
    /// Pruned as empty
    Removed,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub metrics: RunMetrics,
    pub conflicts: Vec<ConflictRecord>,
    pub dry_run: bool,
}

/// Walks a library and renames book folders to their canonical names.
///
/// Each directory below the root goes through three steps:
/// 1. stale sidecar cleanup (if enabled)
/// 2. rename, if the folder holds a metadata record
/// 3. otherwise, empty-folder pruning (if enabled)
///
/// A dry run performs no filesystem mutation but emits exactly the report
/// lines a real run would.
#[derive(Debug, Clone)]
pub struct Renamer {
    options: RunOptions,
}

impl Renamer {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    /// Run over the whole tree, writing report lines to `sink`.
    ///
    /// # Errors
    ///
    /// Stops at the first unreadable or malformed metadata record, unnameable
    /// book, or failed filesystem operation. Destination conflicts are not
    /// errors; they are listed at the end of the report.
    pub fn run<S: ReportSink>(&self, sink: S) -> Result<RunSummary> {
        let options = &self.options;
        tracing::info!(
            "Scanning {} (max_renames={}, dry_run={}, remove_empty_folders={}, remove_abs_metadata={}, move_strategy={:?})",
            options.root_folder,
            options.max_renames,
            options.dry_run,
            options.remove_empty_folders,
            options.remove_abs_metadata,
            options.move_strategy
        );

        let mut state = RunState::new(RenameBudget::new(options.max_renames), sink);
        let mut walker = DirectoryWalker::new(&options.root_folder)?;

        while let Some(dir) = walker.next() {
            let dir = dir?;

            let outcome = self.process_directory(&dir, &mut state)?;
            if outcome != DirectoryOutcome::Kept {
                walker.skip_descendants(&dir);
            }

            if state.budget.is_exhausted() {
                state.report(LIMIT_REACHED_LINE)?;
                state.metrics.record_limit_reached();
                break;
            }
        }

        if !state.conflicts.is_empty() {
            state.report(CONFLICTS_HEADER)?;
            let lines: Vec<String> = state.conflicts.iter().map(ToString::to_string).collect();
            for line in lines {
                state.report(line)?;
            }
        }

        state.metrics.log_summary(options.dry_run);

        Ok(RunSummary {
            metrics: state.metrics.clone(),
            conflicts: std::mem::take(&mut state.conflicts),
            dry_run: options.dry_run,
        })
    }

    /// Compute the rename plan for a book folder from its metadata record.
    pub fn plan(&self, dir: &Utf8Path) -> Result<RenamePlan> {
        let metadata_path = dir.join(&self.options.metadata_file);
        let record = AudiobookRecord::load(&metadata_path)?;
        let name = CanonicalName::from_record(&record)
            .with_context(|| format!("Cannot derive a folder name for {}", dir))?;

        let parent = dir
            .parent()
            .with_context(|| format!("Folder has no parent: {}", dir))?;
        let target = parent.join(name.flattened_folder_name());
        let library_path = name.library_path(&self.options.root_folder);

        Ok(RenamePlan {
            source: dir.to_path_buf(),
            target,
            library_path,
            name,
        })
    }

    /// Process one directory yielded by the walker.
    pub fn process_directory<S: ReportSink>(
        &self,
        dir: &Utf8Path,
        state: &mut RunState<S>,
    ) -> Result<DirectoryOutcome> {
        state.metrics.record_directory_visited();

        let sidecar_removed = self.remove_stale_metadata(dir, state)?;

        if dir.join(&self.options.metadata_file).exists() {
            return self.rename_book_folder(dir, state);
        }

        if self.options.remove_empty_folders && self.is_folder_empty(dir, sidecar_removed)? {
            self.remove_empty_folder(dir, state)?;
            return Ok(DirectoryOutcome::Removed);
        }

        Ok(DirectoryOutcome::Kept)
    }

    /// Returns true if a sidecar was removed (or would have been, in a dry run).
    fn remove_stale_metadata<S: ReportSink>(
        &self,
        dir: &Utf8Path,
        state: &mut RunState<S>,
    ) -> Result<bool> {
        if !self.options.remove_abs_metadata {
            return Ok(false);
        }

        let sidecar = dir.join(&self.options.stale_metadata_file);
        if !sidecar.exists() {
            return Ok(false);
        }

        state.report(format!("Will remove: {}", sidecar))?;
        if !self.options.dry_run {
            fs::remove_file(&sidecar)
                .with_context(|| format!("Failed to remove stale metadata: {}", sidecar))?;
        }
        state.metrics.record_sidecar_removed();

        Ok(true)
    }

    fn rename_book_folder<S: ReportSink>(
        &self,
        dir: &Utf8Path,
        state: &mut RunState<S>,
    ) -> Result<DirectoryOutcome> {
        let plan = self.plan(dir)?;
        tracing::debug!(
            "{}: canonical name {:?}, library path {}",
            dir,
            plan.name.flattened_folder_name(),
            plan.library_path
        );

        if plan.is_canonical() {
            state.metrics.record_already_canonical();
            return Ok(DirectoryOutcome::Kept);
        }

        state.budget.consume();
        state.report(format!("Current Folder: {}", plan.source))?;
        state.report(format!("New Folder: {}", plan.target))?;

        if state.simulated.is_occupied(&plan.target) {
            state.record_conflict(plan.target, plan.source);
            return Ok(DirectoryOutcome::Kept);
        }

        if self.options.dry_run {
            state.simulated.record_move(&plan.source, &plan.target);
        } else {
            self.apply(&plan, state)?;
        }
        state.metrics.record_renamed();

        Ok(DirectoryOutcome::Moved)
    }

    fn apply<S: ReportSink>(&self, plan: &RenamePlan, state: &mut RunState<S>) -> Result<()> {
        match self.options.move_strategy {
            MoveStrategy::Rename => fs::rename(&plan.source, &plan.target)
                .with_context(|| format!("Failed to rename {} to {}", plan.source, plan.target)),
            MoveStrategy::Hardlink => {
                move_preserving_inodes(&plan.source, &plan.target, state.sink_mut())
            }
        }
    }

    /// Empty apart from the incidental file (and the stale sidecar when it was
    /// just removed, so a dry run judges the folder as a real run would).
    fn is_folder_empty(&self, dir: &Utf8Path, ignore_sidecar: bool) -> Result<bool> {
        let incidental = OsStr::new(&self.options.incidental_file);
        let sidecar = OsStr::new(&self.options.stale_metadata_file);

        for entry in fs::read_dir(dir).with_context(|| format!("Failed to read folder: {}", dir))? {
            let entry = entry.with_context(|| format!("Failed to read entry in: {}", dir))?;
            let name = entry.file_name();
            let name = name.as_os_str();

            if name == incidental || (ignore_sidecar && name == sidecar) {
                continue;
            }
            return Ok(false);
        }

        Ok(true)
    }

    fn remove_empty_folder<S: ReportSink>(
        &self,
        dir: &Utf8Path,
        state: &mut RunState<S>,
    ) -> Result<()> {
        if !self.options.dry_run {
            let incidental = dir.join(&self.options.incidental_file);
            if incidental.exists() {
                fs::remove_file(&incidental)
                    .with_context(|| format!("Failed to remove {}", incidental))?;
            }
            fs::remove_dir(dir).with_context(|| format!("Failed to remove empty folder: {}", dir))?;
        } else {
            state.simulated.record_removal(dir);
        }

        state.report(format!("Removed empty folder: {}", dir))?;
        state.metrics.record_folder_removed();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemoryReport;
    use tempfile::TempDir;

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, root)
    }

    fn write_book(dir: &Utf8Path, json: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("metadata.json"), json).unwrap();
    }

    #[test]
    fn test_plan_targets_flattened_sibling() {
        let (_temp_dir, root) = temp_root();
        let book = root.join("Author/some folder");
        write_book(
            &book,
            r#"{"authors": ["Jane Doe"], "title": "The Start", "series": ["Saga #1"]}"#,
        );

        let renamer = Renamer::new(RunOptions::new(&root));
        let plan = renamer.plan(&book).unwrap();

        assert_eq!(plan.target, root.join("Author/Jane Doe - Saga, The Start 1"));
        assert_eq!(plan.library_path, root.join("Jane Doe/Saga"));
        assert!(!plan.is_canonical());
    }

    #[test]
    fn test_canonical_folder_is_kept_without_budget() {
        let (_temp_dir, root) = temp_root();
        let book = root.join("A - T");
        write_book(&book, r#"{"authors": ["A"], "title": "T"}"#);

        let renamer = Renamer::new(RunOptions::new(&root));
        let mut state = RunState::new(RenameBudget::new(1), MemoryReport::new());
        let outcome = renamer.process_directory(&book, &mut state).unwrap();

        assert_eq!(outcome, DirectoryOutcome::Kept);
        assert_eq!(state.budget.remaining(), 1);
        assert!(state.sink().lines().is_empty());
        assert_eq!(state.metrics.already_canonical, 1);
    }

    #[test]
    fn test_book_folder_with_extra_files_is_not_pruned() {
        let (_temp_dir, root) = temp_root();
        let book = root.join("A - T");
        write_book(&book, r#"{"authors": ["A"], "title": "T"}"#);

        let renamer = Renamer::new(RunOptions::new(&root).with_remove_empty_folders(true));
        let mut state = RunState::new(RenameBudget::new(1), MemoryReport::new());
        renamer.process_directory(&book, &mut state).unwrap();

        assert!(book.exists());
    }

    #[test]
    fn test_sidecar_only_folder_is_pruned_in_dry_run_preview() {
        let (_temp_dir, root) = temp_root();
        let dir = root.join("leftover");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("metadata.abs"), b"").unwrap();

        let renamer = Renamer::new(
            RunOptions::new(&root)
                .with_remove_abs_metadata(true)
                .with_remove_empty_folders(true)
                .with_dry_run(true),
        );
        let mut state = RunState::new(RenameBudget::new(1), MemoryReport::new());
        let outcome = renamer.process_directory(&dir, &mut state).unwrap();

        assert_eq!(outcome, DirectoryOutcome::Removed);
        assert!(dir.join("metadata.abs").exists());
        assert_eq!(
            state.sink().lines(),
            [
                format!("Will remove: {}", dir.join("metadata.abs")),
                format!("Removed empty folder: {}", dir),
            ]
        );
    }

    #[test]
    fn test_non_empty_folder_without_metadata_is_skipped() {
        let (_temp_dir, root) = temp_root();
        let dir = root.join("misc");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("notes.txt"), b"").unwrap();

        let renamer = Renamer::new(RunOptions::new(&root).with_remove_empty_folders(true));
        let mut state = RunState::new(RenameBudget::new(1), MemoryReport::new());
        let outcome = renamer.process_directory(&dir, &mut state).unwrap();

        assert_eq!(outcome, DirectoryOutcome::Kept);
        assert!(dir.exists());
        assert!(state.sink().lines().is_empty());
    }
}
