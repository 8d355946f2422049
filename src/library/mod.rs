//! The library store: owns the in-memory collection, enforces record validity,
//! and flushes a full snapshot through the persistence layer after every
//! mutation. Reads (search, statistics) never touch storage.
//!
//! Records are addressed by position only. Removing index `i` shifts every later
//! record down by one, so indexes are not stable across removals.

mod outcome;
mod stats;

pub use outcome::Outcome;
pub use stats::Statistics;

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use tracing::{debug, info, warn};

use crate::error::{LibraryError, PersistenceError, Result, ValidationError};
use crate::models::{Book, NewBook, SearchField, MIN_PUBLICATION_YEAR};
use crate::storage::{JsonFileStore, Persistence};

/// In-memory book collection kept in sync with its backing store.
#[derive(Debug)]
pub struct Library<P = JsonFileStore> {
    books: Vec<Book>,
    store: P,
}

impl<P: Persistence> Library<P> {
    /// Load the collection from `store`. A load failure is handed back as a
    /// warning alongside an empty, fully usable library. Content that failed
    /// to parse is set aside first so the next save cannot destroy it.
    pub fn initialize(store: P) -> Outcome<Self> {
        match store.load() {
            Ok(books) => {
                info!(count = books.len(), "library loaded");
                Outcome::durable(Self { books, store })
            }
            Err(err) => {
                warn!(error = %err, "could not load library, starting empty");
                if matches!(err, PersistenceError::Parse { .. }) {
                    if let Err(aside) = store.set_aside() {
                        warn!(error = %aside, "could not set aside unreadable library file");
                    }
                }
                Outcome::with_warning(
                    Self {
                        books: Vec::new(),
                        store,
                    },
                    err,
                )
            }
        }
    }

    /// All records in insertion order.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn get(&self, index: usize) -> Option<&Book> {
        self.books.get(index)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    /// Validate `new_book`, stamp it with the current local time, append it,
    /// and persist. Validation failures leave the collection untouched. A failed
    /// write keeps the record in memory and comes back as a warning.
    pub fn add(&mut self, new_book: NewBook) -> Result<Outcome<Book>> {
        let now = Local::now();
        let book = build_book(new_book, now.year(), now.naive_local())?;

        self.books.push(book.clone());
        info!(
            title = %book.title,
            author = %book.author,
            count = self.books.len(),
            "book added"
        );
        Ok(self.flush(book))
    }

    /// Delete the record at `index`, shifting later records down by one, and
    /// persist. An out-of-range index is rejected without touching storage.
    pub fn remove(&mut self, index: usize) -> Result<Outcome<Book>> {
        if index >= self.books.len() {
            return Err(LibraryError::IndexOutOfRange {
                index,
                len: self.books.len(),
            });
        }

        let removed = self.books.remove(index);
        info!(index, title = %removed.title, count = self.books.len(), "book removed");
        Ok(self.flush(removed))
    }

    /// Case-insensitive substring search on one field, in collection order.
    /// An empty term matches every record.
    pub fn search(&self, term: &str, field: SearchField) -> Vec<&Book> {
        self.search_positions(term, field)
            .into_iter()
            .map(|index| &self.books[index])
            .collect()
    }

    /// Like [`Library::search`], but yields positional indexes so callers can
    /// act on a hit (for example remove it).
    pub fn search_positions(&self, term: &str, field: SearchField) -> Vec<usize> {
        let needle = term.to_lowercase();
        let hits: Vec<usize> = self
            .books
            .iter()
            .enumerate()
            .filter(|(_, book)| field.value_of(book).to_lowercase().contains(&needle))
            .map(|(index, _)| index)
            .collect();
        debug!(term, field = %field, hits = hits.len(), "search");
        hits
    }

    /// Aggregate figures over the current collection.
    pub fn statistics(&self) -> Statistics {
        Statistics::from_books(&self.books)
    }

    fn flush<T>(&self, value: T) -> Outcome<T> {
        match self.store.save(&self.books) {
            Ok(()) => Outcome::durable(value),
            Err(err) => {
                warn!(error = %err, "library change was not persisted");
                Outcome::with_warning(value, err)
            }
        }
    }
}

/// Check the user-entered fields and produce the record that will be stored.
/// Title and author are trimmed; the timestamp drops sub-second precision so
/// the in-memory record matches what the backing file can represent.
fn build_book(
    new_book: NewBook,
    current_year: i32,
    now: NaiveDateTime,
) -> std::result::Result<Book, ValidationError> {
    let title = new_book.title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    let author = new_book.author.trim();
    if author.is_empty() {
        return Err(ValidationError::EmptyAuthor);
    }
    let year = new_book.publication_year;
    if !(MIN_PUBLICATION_YEAR..=current_year).contains(&year) {
        return Err(ValidationError::YearOutOfRange {
            year,
            max: current_year,
        });
    }

    Ok(Book {
        title: title.to_string(),
        author: author.to_string(),
        publication_year: year,
        genre: new_book.genre,
        read_status: new_book.read_status,
        added_at: now.with_nanosecond(0).unwrap_or(now),
    })
}
