//! Domain models for the personal library. These are plain data holders that
//! double as the on-disk record layout: the serde attributes below pin the
//! exact key names and value formats of the backing file, so other layers can
//! stay focused on validation, persistence, and presentation.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Layout of the `added_date` field, local wall-clock time without an offset.
pub const ADDED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Earliest publication year accepted by the store.
pub const MIN_PUBLICATION_YEAR: i32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One catalogued book. Records have no identity field: the library addresses
/// them purely by their position in insertion order.
pub struct Book {
    /// Title as entered by the user (trimmed). Duplicates are allowed.
    pub title: String,
    /// Author as entered by the user (trimmed).
    pub author: String,
    /// Year of publication, validated against `[1000, current year]` on add.
    pub publication_year: i32,
    pub genre: Genre,
    /// `true` once the user has read the book.
    pub read_status: bool,
    /// Stamped by the library when the record is created and never changed.
    #[serde(rename = "added_date", with = "added_date")]
    pub added_at: NaiveDateTime,
}

impl Book {
    /// `Title by Author`, used by list rows and status messages.
    pub fn display_title(&self) -> String {
        format!("{} by {}", self.title, self.author)
    }

    /// The creation timestamp rendered exactly as it is stored on disk.
    pub fn added_date(&self) -> String {
        self.added_at.format(ADDED_DATE_FORMAT).to_string()
    }

    /// Human label for the read flag.
    pub fn read_label(&self) -> &'static str {
        if self.read_status {
            "Read"
        } else {
            "Unread"
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_title())
    }
}

/// User-supplied fields for a new record. The library validates these and adds
/// the timestamp itself, so callers never construct a [`Book`] directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub publication_year: i32,
    pub genre: Genre,
    pub read_status: bool,
}

impl NewBook {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        publication_year: i32,
        genre: Genre,
        read_status: bool,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            publication_year,
            genre,
            read_status,
        }
    }
}

/// The fixed set of genres a book can be filed under. On disk each variant is
/// stored as its display label.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Genre {
    #[default]
    Fiction,
    #[serde(rename = "Non-Fiction")]
    NonFiction,
    Science,
    Technology,
    Fantasy,
    Romance,
    Poetry,
    #[serde(rename = "Self-Help")]
    SelfHelp,
    Art,
    Religion,
    History,
    Other,
}

impl Genre {
    /// Every genre in the order the add form offers them.
    pub const ALL: [Genre; 12] = [
        Genre::Fiction,
        Genre::NonFiction,
        Genre::Science,
        Genre::Technology,
        Genre::Fantasy,
        Genre::Romance,
        Genre::Poetry,
        Genre::SelfHelp,
        Genre::Art,
        Genre::Religion,
        Genre::History,
        Genre::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Genre::Fiction => "Fiction",
            Genre::NonFiction => "Non-Fiction",
            Genre::Science => "Science",
            Genre::Technology => "Technology",
            Genre::Fantasy => "Fantasy",
            Genre::Romance => "Romance",
            Genre::Poetry => "Poetry",
            Genre::SelfHelp => "Self-Help",
            Genre::Art => "Art",
            Genre::Religion => "Religion",
            Genre::History => "History",
            Genre::Other => "Other",
        }
    }

    /// Parse a label, folding anything unrecognised into [`Genre::Other`].
    /// Useful when importing free-form genre text such as "Science Fiction".
    pub fn from_label_lossy(label: &str) -> Self {
        label.parse().unwrap_or(Genre::Other)
    }

    /// Step through [`Genre::ALL`], wrapping at both ends.
    pub fn cycle(self, offset: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let current = Self::ALL.iter().position(|g| *g == self).unwrap_or(0) as isize;
        Self::ALL[(current + offset).rem_euclid(len) as usize]
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Genre {
    type Err = ValidationError;

    /// Case-insensitive match against the display labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Genre::ALL
            .into_iter()
            .find(|genre| genre.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownGenre(s.to_string()))
    }
}

/// Which text field a search matches against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SearchField {
    #[default]
    Title,
    Author,
    Genre,
}

impl SearchField {
    pub const ALL: [SearchField; 3] = [SearchField::Title, SearchField::Author, SearchField::Genre];

    pub fn label(self) -> &'static str {
        match self {
            SearchField::Title => "Title",
            SearchField::Author => "Author",
            SearchField::Genre => "Genre",
        }
    }

    /// The text of `book` this field selects.
    pub fn value_of(self, book: &Book) -> &str {
        match self {
            SearchField::Title => &book.title,
            SearchField::Author => &book.author,
            SearchField::Genre => book.genre.label(),
        }
    }

    /// Rotate Title -> Author -> Genre -> Title.
    pub fn next(self) -> Self {
        match self {
            SearchField::Title => SearchField::Author,
            SearchField::Author => SearchField::Genre,
            SearchField::Genre => SearchField::Title,
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SearchField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SearchField::ALL
            .into_iter()
            .find(|field| field.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownSearchField(s.to_string()))
    }
}

/// Serde codec for `added_date` (`YYYY-MM-DD HH:MM:SS`).
mod added_date {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::ADDED_DATE_FORMAT;

    pub(super) fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(ADDED_DATE_FORMAT))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, ADDED_DATE_FORMAT).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_book() -> Book {
        Book {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            publication_year: 1965,
            genre: Genre::SelfHelp,
            read_status: true,
            added_at: NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(7, 5, 0)
                .unwrap(),
        }
    }

    #[test]
    fn book_serializes_with_backing_file_keys() {
        let value = serde_json::to_value(sample_book()).unwrap();
        assert_eq!(value["title"], "Dune");
        assert_eq!(value["author"], "Frank Herbert");
        assert_eq!(value["publication_year"], 1965);
        assert_eq!(value["genre"], "Self-Help");
        assert_eq!(value["read_status"], true);
        assert_eq!(value["added_date"], "2024-03-09 07:05:00");
        assert_eq!(value.as_object().unwrap().len(), 6);
    }

    #[test]
    fn malformed_added_date_is_rejected() {
        let raw = r#"{"title":"A","author":"B","publication_year":2000,
            "genre":"Art","read_status":false,"added_date":"09/03/2024"}"#;
        assert!(serde_json::from_str::<Book>(raw).is_err());
    }

    #[test]
    fn unknown_genre_on_disk_is_rejected() {
        let raw = r#"{"title":"A","author":"B","publication_year":2000,
            "genre":"Science Fiction","read_status":false,"added_date":"2024-01-01 00:00:00"}"#;
        assert!(serde_json::from_str::<Book>(raw).is_err());
    }

    #[test]
    fn genre_parsing_is_case_insensitive() {
        assert_eq!("non-fiction".parse::<Genre>().unwrap(), Genre::NonFiction);
        assert_eq!(" HISTORY ".parse::<Genre>().unwrap(), Genre::History);
        assert!(matches!(
            "Science Fiction".parse::<Genre>(),
            Err(ValidationError::UnknownGenre(_))
        ));
    }

    #[test]
    fn lossy_genre_falls_back_to_other() {
        assert_eq!(Genre::from_label_lossy("Science Fiction"), Genre::Other);
        assert_eq!(Genre::from_label_lossy("fantasy"), Genre::Fantasy);
    }

    #[test]
    fn genre_cycle_wraps() {
        assert_eq!(Genre::Fiction.cycle(-1), Genre::Other);
        assert_eq!(Genre::Other.cycle(1), Genre::Fiction);
        assert_eq!(Genre::Fiction.cycle(2), Genre::Science);
    }

    #[test]
    fn defaults_are_first_choices() {
        assert_eq!(Genre::default(), Genre::ALL[0]);
        assert_eq!(SearchField::default(), SearchField::Title);
    }

    #[test]
    fn search_field_parsing() {
        assert_eq!("author".parse::<SearchField>().unwrap(), SearchField::Author);
        assert!(matches!(
            "isbn".parse::<SearchField>(),
            Err(ValidationError::UnknownSearchField(field)) if field == "isbn"
        ));
    }

    #[test]
    fn search_field_selects_text() {
        let book = sample_book();
        assert_eq!(SearchField::Title.value_of(&book), "Dune");
        assert_eq!(SearchField::Author.value_of(&book), "Frank Herbert");
        assert_eq!(SearchField::Genre.value_of(&book), "Self-Help");
    }
}
