use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::iter;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::PersistenceError;
use crate::models::Book;

use super::Persistence;

/// Default backing file name inside the data directory.
pub const LIBRARY_FILE_NAME: &str = "library.json";

/// Stores the collection as a bare JSON array of book objects. There is no
/// wrapper object or version field: the file is the array.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store `library.json` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(LIBRARY_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling of the backing file with `suffix` appended to its name.
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Sibling file the snapshot is staged in before it replaces the real one.
    fn staging_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    /// First `.corrupt` sibling that does not exist yet, so an earlier
    /// quarantined file is never replaced.
    fn quarantine_path(&self) -> PathBuf {
        iter::once(self.sibling(".corrupt"))
            .chain((1..).map(|n| self.sibling(&format!(".corrupt.{n}"))))
            .find(|candidate| !candidate.exists())
            .unwrap_or_else(|| self.sibling(".corrupt"))
    }

    fn write_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl Persistence for JsonFileStore {
    fn load(&self) -> Result<Vec<Book>, PersistenceError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no backing file yet");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let books: Vec<Book> =
            serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Parse {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), count = books.len(), "loaded backing file");
        Ok(books)
    }

    fn save(&self, books: &[Book]) -> Result<(), PersistenceError> {
        let payload = serde_json::to_vec_pretty(books).map_err(PersistenceError::Serialize)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| self.write_error(err))?;
            }
        }

        let staged = self.staging_path();
        let written = File::create(&staged).and_then(|mut file| {
            file.write_all(&payload)?;
            file.sync_all()
        });
        if let Err(err) = written.and_then(|_| fs::rename(&staged, &self.path)) {
            let _ = fs::remove_file(&staged);
            return Err(self.write_error(err));
        }

        debug!(path = %self.path.display(), count = books.len(), "saved backing file");
        Ok(())
    }

    fn set_aside(&self) -> Result<Option<PathBuf>, PersistenceError> {
        let target = self.quarantine_path();
        match fs::rename(&self.path, &target) {
            Ok(()) => {
                info!(
                    from = %self.path.display(),
                    to = %target.display(),
                    "set aside unreadable backing file"
                );
                Ok(Some(target))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(self.write_error(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Genre;
    use chrono::NaiveDate;
    use serde_json::Value;
    use tempfile::tempdir;

    fn book(title: &str, year: i32, genre: Genre, read: bool) -> Book {
        Book {
            title: title.to_string(),
            author: "Ursula K. Le Guin".to_string(),
            publication_year: year,
            genre,
            read_status: read,
            added_at: NaiveDate::from_ymd_opt(2023, 11, 2)
                .unwrap()
                .and_hms_opt(18, 30, 12)
                .unwrap(),
        }
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        assert!(store.load().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn save_then_load_returns_same_books() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        let books = vec![
            book("A Wizard of Earthsea", 1968, Genre::Fantasy, true),
            book("The Dispossessed", 1974, Genre::Fiction, false),
        ];

        store.save(&books).unwrap();
        assert_eq!(store.load().unwrap(), books);
    }

    #[test]
    fn file_is_a_bare_array() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        store
            .save(&[book("Lavinia", 2008, Genre::History, false)])
            .unwrap();

        let raw: Value = serde_json::from_slice(&fs::read(store.path()).unwrap()).unwrap();
        let entries = raw.as_array().expect("top level must be an array");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["added_date"], "2023-11-02 18:30:12");
        assert_eq!(entries[0]["genre"], "History");
    }

    #[test]
    fn save_of_loaded_file_preserves_records() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        let on_disk = r#"[{"added_date":"2020-01-05 09:00:00","read_status":false,
            "genre":"Non-Fiction","publication_year":1999,"author":"Someone",
            "title":"Key Order Varies"}]"#;
        fs::write(store.path(), on_disk).unwrap();

        let loaded = store.load().unwrap();
        store.save(&loaded).unwrap();

        let before: Value = serde_json::from_str(on_disk).unwrap();
        let after: Value = serde_json::from_slice(&fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(store.load(), Err(PersistenceError::Parse { .. })));
    }

    #[test]
    fn empty_file_is_reported() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        fs::write(store.path(), "").unwrap();
        assert!(matches!(store.load(), Err(PersistenceError::Parse { .. })));
    }

    #[test]
    fn wrapper_object_is_reported() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        fs::write(store.path(), r#"{"books": []}"#).unwrap();
        assert!(matches!(store.load(), Err(PersistenceError::Parse { .. })));
    }

    #[test]
    fn set_aside_moves_unreadable_file_next_to_it() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        fs::write(store.path(), "first bad").unwrap();

        let moved = store.set_aside().unwrap().unwrap();
        assert_eq!(moved, dir.path().join("library.json.corrupt"));
        assert_eq!(fs::read_to_string(&moved).unwrap(), "first bad");
        assert!(!store.path().exists());

        fs::write(store.path(), "second bad").unwrap();
        let moved_again = store.set_aside().unwrap().unwrap();
        assert_eq!(moved_again, dir.path().join("library.json.corrupt.1"));
        assert_eq!(fs::read_to_string(&moved).unwrap(), "first bad");
        assert_eq!(fs::read_to_string(&moved_again).unwrap(), "second bad");
    }

    #[test]
    fn set_aside_without_file_is_a_no_op() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        assert_eq!(store.set_aside().unwrap(), None);
    }

    #[test]
    fn save_replaces_previous_snapshot() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        store
            .save(&[
                book("One", 2001, Genre::Art, false),
                book("Two", 2002, Genre::Art, false),
            ])
            .unwrap();
        store.save(&[book("Three", 2003, Genre::Art, true)]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "Three");
        assert!(!store.staging_path().exists());
    }

    #[test]
    fn save_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("deeper").join("books.json"));
        store.save(&[]).unwrap();
        assert!(store.path().exists());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn unwritable_path_is_reported() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-directory");
        fs::write(&blocker, "plain file").unwrap();
        let store = JsonFileStore::new(blocker.join("library.json"));

        let err = store
            .save(&[book("Nowhere", 1990, Genre::Other, false)])
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Write { .. }));
    }
}
