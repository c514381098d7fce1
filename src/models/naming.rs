//! Canonical folder naming for audiobooks.
//!
//! A book with a numbered series entry such as `"Saga #1"` is named
//!
//! - library path: `Authors/Saga`
//! - book folder: `Title, Book 1`
//! - flattened folder: `Authors - Saga, Title 1`
//!
//! A series entry without a number keeps the separators (`Title, Book `,
//! `Authors - Saga, Title `). A book without a series is named `Authors`,
//! `Title` and `Authors - Title`.

use super::record::AudiobookRecord;
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Characters that are not allowed in a folder name on at least one platform.
pub const INVALID_FILE_NAME_CHARACTERS: [char; 9] = ['/', '\\', ':', '*', '"', '?', '<', '>', '|'];

/// `<name> #<digits>`, greedy on the name so `"A #1 B #2"` yields `("A #1 B", "2")`.
static SERIES_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.*) #(\d*)").expect("Invalid series regex"));

/// Errors produced while deriving a canonical name
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NamingError {
    #[error("{component} is empty after removing invalid characters (was {original:?})")]
    EmptyComponent {
        component: &'static str,
        original: String,
    },
}

/// Remove every character in [`INVALID_FILE_NAME_CHARACTERS`].
pub fn strip_invalid_file_name_characters(value: &str) -> String {
    value
        .chars()
        .filter(|c| !INVALID_FILE_NAME_CHARACTERS.contains(c))
        .collect()
}

/// A series entry split into its name and book number.
///
/// The number is empty when the entry has no `#<digits>` marker (or an empty
/// one); the folder name formats keep their separators in that case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPosition {
    pub name: String,
    pub number: String,
}

impl SeriesPosition {
    /// Parse `"<name> #<digits>"`. Entries without the marker keep the whole
    /// text as the name.
    pub fn parse(entry: &str) -> Self {
        match SERIES_PATTERN.captures(entry) {
            Some(caps) => Self {
                name: strip_invalid_file_name_characters(&caps[1]),
                number: strip_invalid_file_name_characters(&caps[2]),
            },
            None => Self {
                name: strip_invalid_file_name_characters(entry),
                number: String::new(),
            },
        }
    }
}

/// The canonical name of one audiobook folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalName {
    pub authors: String,
    pub title: String,
    pub series: Option<SeriesPosition>,
}

impl CanonicalName {
    /// Derive the canonical name from a metadata record.
    ///
    /// # Errors
    ///
    /// Returns [`NamingError::EmptyComponent`] if the authors or title are empty
    /// once invalid characters are stripped.
    pub fn from_record(record: &AudiobookRecord) -> Result<Self, NamingError> {
        let joined = record.joined_authors();
        let authors = strip_invalid_file_name_characters(&joined);
        if authors.trim().is_empty() {
            return Err(NamingError::EmptyComponent {
                component: "authors",
                original: joined,
            });
        }

        let title = strip_invalid_file_name_characters(&record.title);
        if title.trim().is_empty() {
            return Err(NamingError::EmptyComponent {
                component: "title",
                original: record.title.clone(),
            });
        }

        let series = record.primary_series().map(SeriesPosition::parse);

        Ok(Self {
            authors,
            title,
            series,
        })
    }

    /// `Authors/Series` or `Authors`
    pub fn author_series_subpath(&self) -> String {
        match &self.series {
            Some(series) => format!("{}/{}", self.authors, series.name),
            None => self.authors.clone(),
        }
    }

    /// `Title, Book N` or `Title`
    pub fn book_subfolder(&self) -> String {
        match &self.series {
            Some(series) => format!("{}, Book {}", self.title, series.number),
            None => self.title.clone(),
        }
    }

    /// `Authors - Series, Title N` or `Authors - Title`
    pub fn flattened_folder_name(&self) -> String {
        match &self.series {
            Some(series) => format!(
                "{} - {}, {} {}",
                self.authors, series.name, self.title, series.number
            ),
            None => format!("{} - {}", self.authors, self.title),
        }
    }

    /// Where the book would live in a nested `Authors/Series` library under `root`.
    pub fn library_path(&self, root: &Utf8Path) -> Utf8PathBuf {
        let mut path = root.join(&self.authors);
        if let Some(series) = &self.series {
            path.push(&series.name);
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(authors: &[&str], title: &str, series: Option<&[&str]>) -> AudiobookRecord {
        AudiobookRecord {
            authors: authors.iter().map(|s| s.to_string()).collect(),
            title: title.to_string(),
            series: series.map(|s| s.iter().map(|e| e.to_string()).collect()),
        }
    }

    #[test]
    fn test_numbered_series() {
        let name =
            CanonicalName::from_record(&record(&["Jane Doe"], "The Start", Some(&["Saga #1"])))
                .unwrap();

        assert_eq!(name.author_series_subpath(), "Jane Doe/Saga");
        assert_eq!(name.book_subfolder(), "The Start, Book 1");
        assert_eq!(name.flattened_folder_name(), "Jane Doe - Saga, The Start 1");
    }

    #[test]
    fn test_no_series() {
        let name = CanonicalName::from_record(&record(&["A", "B"], "Solo", None)).unwrap();

        assert_eq!(name.author_series_subpath(), "A, B");
        assert_eq!(name.book_subfolder(), "Solo");
        assert_eq!(name.flattened_folder_name(), "A, B - Solo");
    }

    #[test]
    fn test_series_without_number_keeps_separators() {
        let name =
            CanonicalName::from_record(&record(&["A"], "Side Story", Some(&["Saga"]))).unwrap();

        assert_eq!(name.author_series_subpath(), "A/Saga");
        assert_eq!(name.book_subfolder(), "Side Story, Book ");
        assert_eq!(name.flattened_folder_name(), "A - Saga, Side Story ");
    }

    #[test]
    fn test_series_with_empty_number() {
        let series = SeriesPosition::parse("Saga #");
        assert_eq!(series.name, "Saga");
        assert_eq!(series.number, "");
    }

    #[test]
    fn test_unmarked_series_is_sanitized() {
        let series = SeriesPosition::parse("Why? Saga");
        assert_eq!(series.name, "Why Saga");
        assert_eq!(series.number, "");
    }

    #[test]
    fn test_series_name_is_greedy() {
        let series = SeriesPosition::parse("A #1 B #2");
        assert_eq!(series.name, "A #1 B");
        assert_eq!(series.number, "2");
    }

    #[test]
    fn test_series_that_sanitizes_to_nothing_is_kept() {
        let name = CanonicalName::from_record(&record(&["A"], "T", Some(&["?? #3"]))).unwrap();
        assert_eq!(name.series.as_ref().map(|s| s.name.as_str()), Some(""));
        assert_eq!(name.flattened_folder_name(), "A - , T 3");
        assert_eq!(name.book_subfolder(), "T, Book 3");
    }

    #[test]
    fn test_empty_series_list_is_no_series() {
        let name = CanonicalName::from_record(&record(&["A"], "T", Some(&[]))).unwrap();
        assert_eq!(name.series, None);
        assert_eq!(name.flattened_folder_name(), "A - T");
    }

    #[test]
    fn test_invalid_characters_stripped() {
        assert_eq!(
            strip_invalid_file_name_characters(r#"A/B\C:D*E"F?G<H>I|J"#),
            "ABCDEFGHIJ"
        );

        let name = CanonicalName::from_record(&record(
            &["AC/DC"],
            "What? Why: Because",
            Some(&["Q*Series #2"]),
        ))
        .unwrap();
        assert_eq!(
            name.flattened_folder_name(),
            "ACDC - QSeries, What Why Because 2"
        );
    }

    #[test]
    fn test_empty_title_is_error() {
        let err = CanonicalName::from_record(&record(&["A"], "???", None)).unwrap_err();
        assert_eq!(
            err,
            NamingError::EmptyComponent {
                component: "title",
                original: "???".to_string()
            }
        );
    }

    #[test]
    fn test_empty_authors_is_error() {
        assert!(matches!(
            CanonicalName::from_record(&record(&[], "T", None)),
            Err(NamingError::EmptyComponent {
                component: "authors",
                ..
            })
        ));
        assert!(CanonicalName::from_record(&record(&["::"], "T", None)).is_err());
    }

    #[test]
    fn test_library_path() {
        let name =
            CanonicalName::from_record(&record(&["Jane Doe"], "The Start", Some(&["Saga #1"])))
                .unwrap();
        assert_eq!(
            name.library_path(Utf8Path::new("/books")),
            Utf8PathBuf::from("/books/Jane Doe/Saga")
        );
    }
}
