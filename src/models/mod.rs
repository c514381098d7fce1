//! Data models for the audiobook renamer.
//!
//! - [`AudiobookRecord`]: the naming fields of a book folder's `metadata.json`
//! - [`CanonicalName`]: the folder names derived from a record
//! - [`RenamerConfig`]: settings loaded from the optional YAML config file
//! - [`RunOptions`]: the resolved settings for one run

pub mod config;
pub mod naming;
pub mod record;

pub use config::{MoveStrategy, RenamerConfig, RunOptions};
pub use naming::{CanonicalName, NamingError, SeriesPosition, strip_invalid_file_name_characters};
pub use record::AudiobookRecord;
