//! Core library surface for the personal library catalog.
//!
//! The store ([`Library`]) and its persistence layer are usable on their own;
//! the `ui` module is one presentation layer built on top of them, and the
//! `bin` target wires the pieces together.
pub mod config;
pub mod error;
pub mod library;
pub mod logging;
pub mod models;
pub mod storage;
pub mod ui;

/// Typed failures every store operation reports.
pub use error::{LibraryError, PersistenceError, ValidationError};

/// The store, its partial-success wrapper, and the aggregate view.
pub use library::{Library, Outcome, Statistics};

/// Domain types that callers pass in and get back.
pub use models::{Book, Genre, NewBook, SearchField};

/// Persistence seam and its JSON file implementation.
pub use storage::{JsonFileStore, Persistence};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
