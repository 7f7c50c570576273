//! Document store: loads the config directory into a [`ConfigStore`] and
//! writes it back.
//!
//! File access goes through the [`DocumentRepository`] port; the file-system
//! adapter lives in `infrastructure::storage`.  Keeping the policy here (which
//! files count, what happens to a malformed one) means it can be tested with
//! a mock repository.
//!
//! # Failure isolation
//!
//! Only a config directory that cannot be created or listed fails
//! [`DocumentStore::load_all`] as a whole.  A file that cannot be read or
//! parsed is reported in [`LoadedStore::failures`] and skipped; with
//! quarantine enabled a malformed file (invalid TOML, or bytes that are not
//! UTF-8) is first renamed out of the way, so the save at the end of `init`
//! cannot overwrite what the user wrote.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dough_core::{parse_document, serialize_document, ConfigStore, FormatError};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::application::options::ConfigOptions;

/// File-system operations the document store needs.
#[cfg_attr(test, mockall::automock)]
pub trait DocumentRepository: Send + Sync {
    /// Creates `dir` and its parents; succeeds if it already exists.
    fn create_dir_all(&self, dir: &Path) -> io::Result<()>;

    /// Lists the regular files directly inside `dir`.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Reads a whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replaces the content of `path`.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Moves a malformed file aside; returns its new path.
    fn quarantine(&self, path: &Path) -> io::Result<PathBuf>;

    /// Copies `path` into the backup area, keeping at most `history` copies.
    fn backup(&self, path: &Path, history: usize) -> io::Result<()>;
}

/// Error type for document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The config directory does not exist and could not be created.
    #[error("failed to create config directory {path}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The config directory could not be listed.
    #[error("failed to list config directory {path}: {source}")]
    DirectoryListing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A config file is not a valid document.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    /// A document could not be written.
    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of a directory load.
#[derive(Debug, Default)]
pub struct LoadedStore {
    /// Documents for every file that loaded.
    pub store: ConfigStore,
    /// Files that were skipped, with the reason.
    pub failures: Vec<StoreError>,
}

/// Loads and saves the documents of a config directory.
pub struct DocumentStore {
    repository: Arc<dyn DocumentRepository>,
    options: ConfigOptions,
}

impl DocumentStore {
    pub fn new(repository: Arc<dyn DocumentRepository>, options: ConfigOptions) -> Self {
        Self {
            repository,
            options,
        }
    }

    pub fn options(&self) -> &ConfigOptions {
        &self.options
    }

    /// Ensures `dir` exists and parses every recognised file in it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DirectoryCreation`] or
    /// [`StoreError::DirectoryListing`] when the directory itself is
    /// unusable.  Per-file problems are reported in [`LoadedStore::failures`].
    pub fn load_all(&self, dir: &Path) -> Result<LoadedStore, StoreError> {
        self.repository
            .create_dir_all(dir)
            .map_err(|source| StoreError::DirectoryCreation {
                path: dir.to_path_buf(),
                source,
            })?;

        let mut files = self
            .repository
            .list_files(dir)
            .map_err(|source| StoreError::DirectoryListing {
                path: dir.to_path_buf(),
                source,
            })?;
        files.sort();

        let mut loaded = LoadedStore::default();
        for path in files {
            if !self.options.recognises(&path) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                warn!(path = %path.display(), "skipping config file with non UTF-8 name");
                continue;
            };
            let file_name = file_name.to_string();

            let text = match self.repository.read_to_string(&path) {
                Ok(text) => text,
                Err(source) => {
                    // Bytes that are not UTF-8 are the user's content too.
                    if source.kind() == io::ErrorKind::InvalidData {
                        self.set_aside(&path);
                    }
                    let err = StoreError::Read { path, source };
                    error!("{err}");
                    loaded.failures.push(err);
                    continue;
                }
            };

            match parse_document(&text) {
                Ok(doc) => {
                    if self.options.backup_history > 0 {
                        if let Err(e) = self.repository.backup(&path, self.options.backup_history) {
                            warn!(path = %path.display(), "failed to back up config file: {e}");
                        }
                    }
                    debug!(file = %file_name, keys = doc.len(), "loaded config file");
                    loaded.store.insert(file_name, doc);
                }
                Err(source) => {
                    self.set_aside(&path);
                    let err = StoreError::Parse { path, source };
                    error!("{err}");
                    loaded.failures.push(err);
                }
            }
        }
        Ok(loaded)
    }

    /// Quarantines a malformed file when the options ask for it.
    fn set_aside(&self, path: &Path) {
        if !self.options.quarantine_malformed {
            return;
        }
        match self.repository.quarantine(path) {
            Ok(moved) => warn!(
                path = %path.display(),
                moved_to = %moved.display(),
                "malformed config file moved aside"
            ),
            Err(e) => warn!(path = %path.display(), "failed to move malformed config file: {e}"),
        }
    }

    /// Writes every document to `dir/<file name>`.
    ///
    /// Returns the files that failed; the others are written regardless.
    pub fn save_all(&self, store: &ConfigStore, dir: &Path) -> Vec<StoreError> {
        let mut failures = Vec::new();
        for (file, doc) in store.iter() {
            let path = dir.join(file);
            let text = serialize_document(doc);
            match self.repository.write(&path, &text) {
                Ok(()) => debug!(file, keys = doc.len(), "saved config file"),
                Err(source) => {
                    let err = StoreError::Write { path, source };
                    error!("{err}");
                    failures.push(err);
                }
            }
        }
        failures
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
