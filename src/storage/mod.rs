//! Persistence layer: maps the whole book collection to and from one durable
//! snapshot. The library store only talks to the [`Persistence`] trait so tests
//! can swap in doubles that count or fail writes.

mod json_file;

pub use json_file::JsonFileStore;

use std::path::PathBuf;

use crate::error::PersistenceError;
use crate::models::Book;

/// Full-snapshot storage for the book collection.
pub trait Persistence {
    /// Return the stored collection, or an empty one when nothing was saved yet.
    fn load(&self) -> Result<Vec<Book>, PersistenceError>;

    /// Replace the stored collection with `books` in one step.
    fn save(&self, books: &[Book]) -> Result<(), PersistenceError>;

    /// Move stored content that failed to parse out of the way, so the next
    /// save cannot overwrite it. Returns where it went, if anywhere.
    fn set_aside(&self) -> Result<Option<PathBuf>, PersistenceError> {
        Ok(None)
    }
}
