//! On-disk locations used by the binary. The library store itself takes an
//! explicit path; only the application bootstrap consults the home directory
//! or the environment.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;

use crate::storage::JsonFileStore;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".personal-library";
/// Log file written next to the backing file.
const LOG_FILE_NAME: &str = "library.log";
/// Overrides the data directory when set to a non-empty value.
pub const DATA_DIR_ENV: &str = "PERSONAL_LIBRARY_DIR";

/// Resolved paths for one run of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Use `$PERSONAL_LIBRARY_DIR` if set, otherwise `~/.personal-library`.
    pub fn from_env() -> Result<Self> {
        match env::var_os(DATA_DIR_ENV).filter(|value| !value.is_empty()) {
            Some(dir) => Ok(Self::with_data_dir(dir)),
            None => Self::in_home(),
        }
    }

    pub fn in_home() -> Result<Self> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        Ok(Self::with_data_dir(base_dirs.home_dir().join(DATA_DIR_NAME)))
    }

    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into(),
        }
    }

    pub fn library_file(&self) -> PathBuf {
        JsonFileStore::in_dir(&self.data_dir).path().to_path_buf()
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }

    /// Make sure the data directory exists so the log file can be opened.
    pub fn ensure_data_dir(&self) -> Result<&Path> {
        fs::create_dir_all(&self.data_dir).with_context(|| {
            format!(
                "failed to create data directory {}",
                self.data_dir.display()
            )
        })?;
        Ok(&self.data_dir)
    }

    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::in_dir(&self.data_dir)
    }
}
