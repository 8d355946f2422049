//! Typed failures reported by the library store and its persistence layer.
//! None of these abort the process; the presentation layer renders them.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A user-supplied value broke a field constraint. Nothing was mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required.")]
    EmptyTitle,

    #[error("Author is required.")]
    EmptyAuthor,

    #[error("Publication year {year} must be between 1000 and {max}.")]
    YearOutOfRange { year: i32, max: i32 },

    #[error("Unknown genre: {0}")]
    UnknownGenre(String),

    #[error("Unknown search field: {0} (expected Title, Author or Genre)")]
    UnknownSearchField(String),
}

/// Reading or writing the backing file failed.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} does not contain a valid book list", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize the library")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Every way a library operation can be rejected.
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Index {index} is out of range for a library of {len} books.")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, LibraryError>;
