use anyhow::{Context, Result};
use camino::Utf8Path;
use serde::Deserialize;
use std::fs;

/// Book metadata read from a folder's `metadata.json`.
///
/// Only the fields that drive naming are kept; anything else in the file is
/// ignored. `authors` and `title` are required. `series` may be missing, `null`
/// or empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AudiobookRecord {
    pub authors: Vec<String>,
    pub title: String,
    #[serde(default)]
    pub series: Option<Vec<String>>,
}

impl AudiobookRecord {
    /// Read and parse a metadata record file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid JSON, or lacks `authors`
    /// or `title`.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read metadata record: {}", path))?;

        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse metadata record: {}", path))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Authors joined the way they appear in folder names.
    pub fn joined_authors(&self) -> String {
        self.authors.join(", ")
    }

    /// First series entry, if any
    pub fn primary_series(&self) -> Option<&str> {
        self.series
            .as_ref()
            .and_then(|series| series.first())
            .map(String::as_str)
    }
}
