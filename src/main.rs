//! audiobook-renamer - canonical folder names for an audiobook library
//!
//! Main entry point for the command-line tool.
//!
//! # Execution Flow
//!
//! 1. Parse command-line arguments
//! 2. Initialize diagnostics (stderr, plus rotating files with `--log-dir`)
//! 3. Load the optional YAML config and merge command-line overrides
//! 4. Optionally write the effective config (`--write-config`)
//! 5. Walk the library and rename, clean up, or prune each folder
//!
//! The run report goes to stdout and, with `--output-file`, to that file.

use anyhow::Result;
use audiobook_renamer::cli::Cli;
use audiobook_renamer::report::ConsoleReport;
use audiobook_renamer::services::Renamer;
use audiobook_renamer::{APP_NAME, ConfigManager, VERSION};
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard =
        audiobook_renamer::logging::setup_logging(cli.log_dir.as_deref(), APP_NAME, cli.debug)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let loaded = cli
        .config
        .as_ref()
        .map(|path| ConfigManager::new(path).load_config())
        .transpose()?;
    let config = cli.effective_config(loaded);

    if let Some(path) = &cli.write_config {
        ConfigManager::new(path).save_config(&config)?;
    }

    let Some(options) = cli.run_options(&config) else {
        return Ok(());
    };

    let report = ConsoleReport::new(cli.output_file.clone());
    Renamer::new(options).run(report)?;

    Ok(())
}
