use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// How a book folder is moved onto its canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MoveStrategy {
    /// Atomic same-filesystem rename of the whole directory.
    #[default]
    Rename,
    /// Hard-link every file into the new folder, then remove the originals.
    /// Keeps inode numbers stable for library software that tracks them.
    Hardlink,
}

/// Renamer configuration from the optional YAML config file
///
/// Every field has a default so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenamerConfig {
    /// Name of the JSON metadata record inside a book folder
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,

    /// Name of the obsolete sidecar deleted by `remove_abs_metadata`
    #[serde(default = "default_stale_metadata_file")]
    pub stale_metadata_file: String,

    /// File ignored when deciding whether a folder is empty
    #[serde(default = "default_incidental_file")]
    pub incidental_file: String,

    #[serde(default = "default_max_renames")]
    pub max_renames: i64,

    #[serde(default)]
    pub remove_empty_folders: bool,

    #[serde(default)]
    pub remove_abs_metadata: bool,

    #[serde(default)]
    pub move_strategy: MoveStrategy,
}

impl Default for RenamerConfig {
    fn default() -> Self {
        Self {
            metadata_file: default_metadata_file(),
            stale_metadata_file: default_stale_metadata_file(),
            incidental_file: default_incidental_file(),
            max_renames: default_max_renames(),
            remove_empty_folders: false,
            remove_abs_metadata: false,
            move_strategy: MoveStrategy::Rename,
        }
    }
}

fn default_metadata_file() -> String {
    "metadata.json".to_string()
}

fn default_stale_metadata_file() -> String {
    "metadata.abs".to_string()
}

fn default_incidental_file() -> String {
    ".DS_Store".to_string()
}

fn default_max_renames() -> i64 {
    1
}

/// Fully resolved options for a single run.
///
/// Built from [`RenamerConfig`] plus command-line overrides; see
/// [`RunOptions::from_config`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub root_folder: Utf8PathBuf,
    /// Rename cap; any negative value means unlimited
    pub max_renames: i64,
    pub remove_empty_folders: bool,
    pub remove_abs_metadata: bool,
    pub dry_run: bool,
    pub move_strategy: MoveStrategy,
    pub metadata_file: String,
    pub stale_metadata_file: String,
    pub incidental_file: String,
}

impl RunOptions {
    /// Options with every setting taken from the built-in defaults.
    pub fn new(root_folder: impl Into<Utf8PathBuf>) -> Self {
        Self::from_config(root_folder, &RenamerConfig::default())
    }

    /// Options seeded from a loaded configuration file.
    pub fn from_config(root_folder: impl Into<Utf8PathBuf>, config: &RenamerConfig) -> Self {
        Self {
            root_folder: root_folder.into(),
            max_renames: config.max_renames,
            remove_empty_folders: config.remove_empty_folders,
            remove_abs_metadata: config.remove_abs_metadata,
            dry_run: false,
            move_strategy: config.move_strategy,
            metadata_file: config.metadata_file.clone(),
            stale_metadata_file: config.stale_metadata_file.clone(),
            incidental_file: config.incidental_file.clone(),
        }
    }

    pub fn with_max_renames(mut self, max_renames: i64) -> Self {
        self.max_renames = max_renames;
        self
    }

    pub fn with_remove_empty_folders(mut self, enabled: bool) -> Self {
        self.remove_empty_folders = enabled;
        self
    }

    pub fn with_remove_abs_metadata(mut self, enabled: bool) -> Self {
        self.remove_abs_metadata = enabled;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_move_strategy(mut self, strategy: MoveStrategy) -> Self {
        self.move_strategy = strategy;
        self
    }
}
