// Run state module
//
// Everything that changes while a run walks the tree lives in RunState and is
// passed explicitly through the planner; nothing is global.

use crate::metrics::RunMetrics;
use crate::report::ReportSink;
use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::fmt;

/// Remaining number of renames allowed in this run.
///
/// A negative value means no limit. Every rename attempt (including one that
/// ends in a conflict) consumes one unit; the run stops once the counter hits
/// exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenameBudget {
    remaining: i64,
}

impl RenameBudget {
    pub fn new(max_renames: i64) -> Self {
        Self {
            remaining: max_renames,
        }
    }

    pub fn unlimited() -> Self {
        Self::new(-1)
    }

    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    pub fn is_unlimited(&self) -> bool {
        self.remaining < 0
    }

    pub fn consume(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// A planned rename whose destination was already taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictRecord {
    /// Where the folder should have gone
    pub destination: Utf8PathBuf,
    /// The folder, still at its old location
    pub source: Utf8PathBuf,
}

impl fmt::Display for ConflictRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.destination, self.source)
    }
}

/// Moves and removals a dry run has pretended to perform.
///
/// Later steps of the same dry run see these paths the way a real run would
/// see the disk at that point.
#[derive(Debug, Default, Clone)]
pub struct SimulatedChanges {
    occupied: HashSet<Utf8PathBuf>,
    vacated: HashSet<Utf8PathBuf>,
}

impl SimulatedChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_move(&mut self, source: &Utf8Path, destination: &Utf8Path) {
        self.vacate(source);
        self.vacated.remove(destination);
        self.occupied.insert(destination.to_path_buf());
    }

    pub fn record_removal(&mut self, dir: &Utf8Path) {
        self.vacate(dir);
    }

    fn vacate(&mut self, path: &Utf8Path) {
        self.occupied.remove(path);
        self.vacated.insert(path.to_path_buf());
    }

    /// Whether `path` is taken, combining simulated changes with the disk.
    ///
    /// Uses `symlink_metadata` so that a dangling symlink also counts as taken.
    pub fn is_occupied(&self, path: &Utf8Path) -> bool {
        if self.occupied.contains(path) {
            return true;
        }
        if self.vacated.contains(path) {
            return false;
        }
        path.symlink_metadata().is_ok()
    }
}

/// Mutable state for a single run
pub struct RunState<S: ReportSink> {
    pub budget: RenameBudget,
    pub conflicts: Vec<ConflictRecord>,
    pub metrics: RunMetrics,
    /// Only populated in dry runs
    pub simulated: SimulatedChanges,
    sink: S,
}

impl<S: ReportSink> RunState<S> {
    pub fn new(budget: RenameBudget, sink: S) -> Self {
        Self {
            budget,
            conflicts: Vec::new(),
            metrics: RunMetrics::new(),
            simulated: SimulatedChanges::new(),
            sink,
        }
    }

    /// Emit a report line
    pub fn report(&mut self, line: impl AsRef<str>) -> Result<()> {
        self.sink.emit(line.as_ref())
    }

    pub fn record_conflict(&mut self, destination: Utf8PathBuf, source: Utf8PathBuf) {
        tracing::warn!("Destination already exists: {} (from {})", destination, source);
        self.metrics.record_conflict();
        self.conflicts.push(ConflictRecord {
            destination,
            source,
        });
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemoryReport;

    #[test]
    fn test_budget_counts_down_to_zero() {
        let mut budget = RenameBudget::new(2);
        assert!(!budget.is_exhausted());

        budget.consume();
        assert_eq!(budget.remaining(), 1);
        assert!(!budget.is_exhausted());

        budget.consume();
        assert!(budget.is_exhausted());
    }

    #[test]
    fn test_unlimited_budget_never_exhausts() {
        let mut budget = RenameBudget::unlimited();
        for _ in 0..1000 {
            budget.consume();
            assert!(!budget.is_exhausted());
        }
        assert!(budget.is_unlimited());
    }

    #[test]
    fn test_conflict_display() {
        let conflict = ConflictRecord {
            destination: Utf8PathBuf::from("/lib/A - T"),
            source: Utf8PathBuf::from("/lib/old"),
        };
        assert_eq!(conflict.to_string(), "/lib/A - T - /lib/old");
    }

    #[test]
    fn test_simulated_move_occupies_destination_and_frees_source() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let source = root.join("old");
        std::fs::create_dir(&source).unwrap();
        let destination = root.join("new");

        let mut simulated = SimulatedChanges::new();
        assert!(simulated.is_occupied(&source));
        assert!(!simulated.is_occupied(&destination));

        simulated.record_move(&source, &destination);
        assert!(!simulated.is_occupied(&source));
        assert!(simulated.is_occupied(&destination));

        simulated.record_move(&destination, &source);
        assert!(simulated.is_occupied(&source));
        assert!(!simulated.is_occupied(&destination));
    }

    #[test]
    fn test_simulated_removal_frees_path() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        std::fs::create_dir(root.join("empty")).unwrap();

        let mut simulated = SimulatedChanges::new();
        simulated.record_removal(&root.join("empty"));

        assert!(!simulated.is_occupied(&root.join("empty")));
    }

    #[test]
    fn test_run_state_records_and_reports() {
        let mut state = RunState::new(RenameBudget::new(1), MemoryReport::new());

        state.report("hello").unwrap();
        state.record_conflict(Utf8PathBuf::from("/a"), Utf8PathBuf::from("/b"));

        assert_eq!(state.conflicts.len(), 1);
        assert_eq!(state.metrics.conflicts, 1);
        assert_eq!(state.sink().lines(), ["hello"]);
    }
}
