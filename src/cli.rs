//! Command-line interface.
//!
//! The snake_case spellings (`--root_folder`, `--max_renames`, ...) are kept
//! as aliases for existing scripts.

use crate::models::{MoveStrategy, RenamerConfig, RunOptions};
use camino::Utf8PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "audiobook-renamer", version)]
#[command(
    about = "Rename audiobook folders to their canonical name from metadata.json",
    long_about = None
)]
pub struct Cli {
    /// Root folder where all audiobooks are located
    #[arg(long, alias = "root_folder", required_unless_present = "write_config")]
    pub root_folder: Option<Utf8PathBuf>,

    /// Maximum number of audiobooks to rename in one run; -1 for no limit
    /// [default: 1, or the config file value]
    #[arg(long, alias = "max_renames", allow_negative_numbers = true)]
    pub max_renames: Option<i64>,

    /// Remove folders that contain nothing (apart from .DS_Store)
    #[arg(long, alias = "remove_empty_folders")]
    pub remove_empty_folders: bool,

    /// Remove obsolete metadata.abs files
    #[arg(long, alias = "remove_abs_metadata")]
    pub remove_abs_metadata: bool,

    /// Report what would happen without changing anything on disk
    #[arg(long, alias = "dry_run")]
    pub dry_run: bool,

    /// Also write the run report to this file (overwritten each run)
    #[arg(long, alias = "output_file")]
    pub output_file: Option<Utf8PathBuf>,

    /// How book folders are moved onto their new name
    #[arg(long, value_enum)]
    pub move_strategy: Option<MoveStrategy>,

    /// YAML configuration file
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Write the effective configuration to this file
    #[arg(long)]
    pub write_config: Option<Utf8PathBuf>,

    /// Directory for rotating diagnostic log files
    #[arg(long)]
    pub log_dir: Option<Utf8PathBuf>,

    /// Enable debug diagnostics
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Merge command-line values over the loaded configuration.
    ///
    /// Explicit values win; boolean flags enable a behaviour that the config
    /// file leaves off. Returns `None` when no root folder was given.
    pub fn run_options(&self, config: &RenamerConfig) -> Option<RunOptions> {
        let root_folder = self.root_folder.clone()?;

        let mut options = RunOptions::from_config(root_folder, config)
            .with_dry_run(self.dry_run)
            .with_remove_empty_folders(config.remove_empty_folders || self.remove_empty_folders)
            .with_remove_abs_metadata(config.remove_abs_metadata || self.remove_abs_metadata);

        if let Some(max_renames) = self.max_renames {
            options = options.with_max_renames(max_renames);
        }
        if let Some(strategy) = self.move_strategy {
            options = options.with_move_strategy(strategy);
        }

        Some(options)
    }

    /// The configuration to use when no file was given or loaded.
    pub fn effective_config(&self, loaded: Option<RenamerConfig>) -> RenamerConfig {
        let mut config = loaded.unwrap_or_default();
        if let Some(max_renames) = self.max_renames {
            config.max_renames = max_renames;
        }
        if let Some(strategy) = self.move_strategy {
            config.move_strategy = strategy;
        }
        config.remove_empty_folders |= self.remove_empty_folders;
        config.remove_abs_metadata |= self.remove_abs_metadata;
        config
    }
}
