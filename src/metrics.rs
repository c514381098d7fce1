// Run metrics module
//
// Counts what a run did so it can be summarized in the diagnostics log and
// inspected by callers.

use std::time::{Duration, Instant};

/// Counters collected over a single run.
///
/// In a dry run the rename and removal counters describe what would have
/// happened.
#[derive(Debug, Clone)]
pub struct RunMetrics {
    /// Directories yielded by the walker and processed
    pub directories_visited: usize,

    /// Book folders already carrying their canonical name
    pub already_canonical: usize,

    /// Book folders renamed (or planned in a dry run)
    pub renamed: usize,

    /// Planned renames blocked by an existing destination
    pub conflicts: usize,

    /// Empty folders pruned
    pub folders_removed: usize,

    /// Stale metadata sidecars removed
    pub sidecars_removed: usize,

    /// Whether the run stopped because the rename budget ran out
    pub limit_reached: bool,

    start_time: Instant,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self {
            directories_visited: 0,
            already_canonical: 0,
            renamed: 0,
            conflicts: 0,
            folders_removed: 0,
            sidecars_removed: 0,
            limit_reached: false,
            start_time: Instant::now(),
        }
    }

    pub fn record_directory_visited(&mut self) {
        self.directories_visited += 1;
    }

    pub fn record_already_canonical(&mut self) {
        self.already_canonical += 1;
    }

    pub fn record_renamed(&mut self) {
        self.renamed += 1;
    }

    pub fn record_conflict(&mut self) {
        self.conflicts += 1;
    }

    pub fn record_folder_removed(&mut self) {
        self.folders_removed += 1;
    }

    pub fn record_sidecar_removed(&mut self) {
        self.sidecars_removed += 1;
    }

    pub fn record_limit_reached(&mut self) {
        self.limit_reached = true;
    }

    /// Time since the run started
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self, dry_run: bool) {
        tracing::info!(
            "Run finished in {:.2}s{}",
            self.elapsed().as_secs_f64(),
            if dry_run { " (dry run)" } else { "" }
        );
        tracing::info!(
            "Folders: {} visited, {} renamed, {} already canonical, {} conflicts",
            self.directories_visited,
            self.renamed,
            self.already_canonical,
            self.conflicts
        );
        tracing::info!(
            "Cleanup: {} empty folders removed, {} stale sidecars removed",
            self.folders_removed,
            self.sidecars_removed
        );
        if self.limit_reached {
            tracing::info!("Stopped early: rename limit reached");
        }
    }
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new()
    }
}
