//! Binary entry point: resolve the data directory, start logging, load the
//! library from its backing file, and drive the Ratatui event loop until the
//! user exits.
use anyhow::Context;
use personal_library::config::AppConfig;
use personal_library::logging::init_logging;
use personal_library::{run_app, App, Library};
use tracing::info;

/// Returning a `Result` bubbles up fatal bootstrap problems (an unwritable data
/// directory, a broken terminal) instead of crashing silently. A corrupt or
/// unreadable library file is not fatal: the app starts empty and says so.
fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    config.ensure_data_dir()?;
    init_logging(&config.log_file()).context("failed to set up logging")?;
    info!(path = %config.library_file().display(), "starting personal library");

    let (library, load_warning) = Library::initialize(config.store()).into_parts();
    let mut app = App::new(library, load_warning);
    run_app(&mut app)
}
