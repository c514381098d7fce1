// audiobook-renamer - canonical folder names for an audiobook library
//
// This is the library crate containing the walk, naming and rename logic.
// The binary crate (main.rs) provides the command-line entry point.

pub mod cli;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod report;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{AudiobookRecord, CanonicalName, MoveStrategy, RenamerConfig, RunOptions};
pub use report::{ConsoleReport, MemoryReport, ReportSink};
pub use services::{DirectoryWalker, Renamer, RunSummary};
pub use state::{ConflictRecord, RenameBudget, RunState, SimulatedChanges};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
