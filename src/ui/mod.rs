//! Ratatui front-end. It is a thin collaborator of the library store: it
//! collects input, calls [`crate::Library`] operations, and renders their
//! results and failures. It never edits the collection or the backing file
//! directly.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
