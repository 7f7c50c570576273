//! ConfigManager: sequences load → scan → bind → save, and later
//! refresh → save.
//!
//! # Lifecycle (for beginners)
//!
//! ```text
//! init(dir, targets)
//!  ├─ normalise dir (trailing separator)
//!  ├─ DocumentStore::load_all(dir)       -- abort here if dir is unusable
//!  ├─ registry.clear(); registry.scan(t) for t in targets
//!  ├─ bind(d) for every accepted descriptor
//!  └─ DocumentStore::save_all()
//!
//! … host runs, mutates settings …
//!
//! refresh()
//!  ├─ write_back(d) for every descriptor captured by init
//!  └─ DocumentStore::save_all()
//! ```
//!
//! `init` can be called again at any time; it forgets the previous registry
//! and re-reads the directory, so settings registered since the last run are
//! appended to their files.  `refresh` never re-scans.
//!
//! Neither call returns an error: every failure is logged and collected in
//! the returned report, and only an unusable directory stops `init` early.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dough_core::ConfigStore;
use tracing::{error, info};

use crate::application::bind::{bind, write_back, BindError, BindOutcome};
use crate::application::options::ConfigOptions;
use crate::application::scan::{DescriptorRegistry, ScanTarget, ValidationError};
use crate::application::store::{DocumentRepository, DocumentStore, StoreError};

/// Summary of an `init` pass.
#[derive(Debug, Default)]
pub struct InitReport {
    /// Normalised config directory.
    pub directory: PathBuf,
    /// Documents read from disk.
    pub files_loaded: usize,
    /// Descriptors accepted by the scan.
    pub descriptors: usize,
    /// Descriptors whose value came from their document.
    pub loaded: usize,
    /// Descriptors written into their document as defaults.
    pub materialized: usize,
    /// Registrations rejected by the scan.
    pub rejected: Vec<ValidationError>,
    /// Descriptors whose value could not be coerced.
    pub bind_failures: Vec<BindError>,
    /// Files that could not be read, parsed or written.
    pub store_failures: Vec<StoreError>,
    /// Set when the directory was unusable and nothing else ran.
    pub aborted: Option<StoreError>,
    pub elapsed: Duration,
}

impl InitReport {
    /// `true` if nothing at all went wrong.
    pub fn is_clean(&self) -> bool {
        self.aborted.is_none()
            && self.rejected.is_empty()
            && self.bind_failures.is_empty()
            && self.store_failures.is_empty()
    }
}

/// Summary of a `refresh` pass.
#[derive(Debug, Default)]
pub struct RefreshReport {
    /// Entries overwritten with their setting's current value.
    pub written: usize,
    pub bind_failures: Vec<BindError>,
    pub store_failures: Vec<StoreError>,
}

impl RefreshReport {
    pub fn is_clean(&self) -> bool {
        self.bind_failures.is_empty() && self.store_failures.is_empty()
    }
}

/// Owns the registry and the store for one config directory.
pub struct ConfigManager {
    documents: DocumentStore,
    directory: PathBuf,
    store: ConfigStore,
    registry: DescriptorRegistry,
}

impl ConfigManager {
    /// Creates a manager; nothing is loaded until [`init`](Self::init).
    pub fn new(repository: Arc<dyn DocumentRepository>, options: ConfigOptions) -> Self {
        Self {
            documents: DocumentStore::new(repository, options),
            directory: PathBuf::new(),
            store: ConfigStore::new(),
            registry: DescriptorRegistry::new(),
        }
    }

    /// Loads `directory`, scans `targets` in order, binds every accepted
    /// descriptor and saves the resulting documents.
    pub fn init(&mut self, directory: impl AsRef<Path>, targets: &[&ScanTarget]) -> InitReport {
        let started = Instant::now();
        self.directory = normalize_directory(directory.as_ref());
        self.store.clear();
        self.registry.clear();

        let mut report = InitReport {
            directory: self.directory.clone(),
            ..InitReport::default()
        };

        match self.documents.load_all(&self.directory) {
            Ok(loaded) => {
                self.store = loaded.store;
                report.files_loaded = self.store.len();
                report.store_failures = loaded.failures;
            }
            Err(e) => {
                error!(directory = %self.directory.display(), "config initialisation aborted: {e}");
                report.aborted = Some(e);
                report.elapsed = started.elapsed();
                return report;
            }
        }

        for target in targets {
            report.rejected.extend(self.registry.scan(target));
        }
        report.descriptors = self.registry.len();

        for descriptor in self.registry.iter() {
            match bind(descriptor, &mut self.store) {
                Ok(BindOutcome::Loaded) => report.loaded += 1,
                Ok(BindOutcome::Materialized) => report.materialized += 1,
                Err(e) => {
                    error!(member = %descriptor.member, "{e}");
                    report.bind_failures.push(e);
                }
            }
        }

        report
            .store_failures
            .extend(self.documents.save_all(&self.store, &self.directory));

        report.elapsed = started.elapsed();
        let target_names: Vec<&str> = targets.iter().map(|t| t.name()).collect();
        info!(
            directory = %self.directory.display(),
            descriptors = report.descriptors,
            materialized = report.materialized,
            "took {}ms to load config in {}",
            report.elapsed.as_millis(),
            target_names.join(", ")
        );
        report
    }

    /// Copies every setting's current value into its document without
    /// touching the disk.  Returns the number of entries written and the
    /// descriptors that failed.
    pub fn sync_documents(&mut self) -> (usize, Vec<BindError>) {
        let mut written = 0;
        let mut failures = Vec::new();
        for descriptor in self.registry.iter() {
            match write_back(descriptor, &mut self.store) {
                Ok(()) => written += 1,
                Err(e) => {
                    error!(member = %descriptor.member, "{e}");
                    failures.push(e);
                }
            }
        }
        (written, failures)
    }

    /// Writes every document to the config directory.
    pub fn save(&self) -> Vec<StoreError> {
        self.documents.save_all(&self.store, &self.directory)
    }

    /// [`sync_documents`](Self::sync_documents) followed by [`save`](Self::save).
    pub fn refresh(&mut self) -> RefreshReport {
        let (written, bind_failures) = self.sync_documents();
        let store_failures = self.save();
        RefreshReport {
            written,
            bind_failures,
            store_failures,
        }
    }

    /// Config directory of the last `init`, with a trailing separator.
    pub fn config_directory(&self) -> &Path {
        &self.directory
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn registry(&self) -> &DescriptorRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ConfigOptions {
        self.documents.options()
    }

    /// Replaces the options used by the next `init`.
    pub fn set_options(&mut self, repository: Arc<dyn DocumentRepository>, options: ConfigOptions) {
        self.documents = DocumentStore::new(repository, options);
    }
}

/// Appends a trailing separator unless `dir` already ends with one.
pub fn normalize_directory(dir: &Path) -> PathBuf {
    // Joining an empty component adds exactly one separator when missing.
    dir.join("")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::store::MockDocumentRepository;
    use dough_core::{ConfigValue, Setting, TypedValue};
    use std::io;
    use std::sync::Mutex;

    #[test]
    fn test_normalize_directory_adds_trailing_separator() {
        let n = normalize_directory(Path::new("Config"));
        assert!(n.to_string_lossy().ends_with(std::path::MAIN_SEPARATOR));
        assert_eq!(normalize_directory(&n), n);
    }

    #[test]
    fn test_init_aborts_when_directory_creation_fails() {
        // Arrange
        static UNTOUCHED: Setting<u32> = Setting::new(9);
        let mut mock = MockDocumentRepository::new();
        mock.expect_create_dir_all()
            .returning(|_| Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only")));
        mock.expect_write().never();
        let mut target = ScanTarget::new("t");
        target.register("U", &UNTOUCHED, ConfigValue::new("U", "u.cfg").default_value(1_u32));
        let mut manager = ConfigManager::new(Arc::new(mock), ConfigOptions::default());

        // Act
        let report = manager.init("/read-only/Config", &[&target]);

        // Assert
        assert!(matches!(report.aborted, Some(StoreError::DirectoryCreation { .. })));
        assert!(manager.store().is_empty());
        assert!(manager.registry().is_empty());
        assert_eq!(UNTOUCHED.get(), 9);
    }

    #[test]
    fn test_init_binds_and_saves_through_repository() {
        // Arrange
        static ENABLED: Setting<bool> = Setting::unset();
        let written: Arc<Mutex<Vec<(PathBuf, String)>>> = Arc::default();
        let sink = Arc::clone(&written);
        let mut mock = MockDocumentRepository::new();
        mock.expect_create_dir_all().returning(|_| Ok(()));
        mock.expect_list_files().returning(|_| Ok(Vec::new()));
        mock.expect_write().returning(move |p, c| {
            sink.lock().unwrap().push((p.to_path_buf(), c.to_string()));
            Ok(())
        });
        let mut target = ScanTarget::new("t");
        target.register(
            "ENABLED",
            &ENABLED,
            ConfigValue::new("LogEnabled", "EngineCore.cfg").default_value(true),
        );
        let mut manager = ConfigManager::new(Arc::new(mock), ConfigOptions::default());

        // Act
        let report = manager.init("Config", &[&target]);

        // Assert
        assert!(report.is_clean(), "{report:?}");
        assert_eq!(report.materialized, 1);
        assert!(ENABLED.get());
        let written = written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, Path::new("Config").join("EngineCore.cfg"));
        assert_eq!(written[0].1, "LogEnabled = true\n");
    }

    #[test]
    fn test_refresh_writes_current_values_without_rescan() {
        // Arrange
        static COUNT: Setting<i64> = Setting::new(0);
        let mut mock = MockDocumentRepository::new();
        mock.expect_create_dir_all().returning(|_| Ok(()));
        mock.expect_list_files().returning(|_| Ok(Vec::new()));
        mock.expect_write().times(2).returning(|_, _| Ok(()));
        let mut target = ScanTarget::new("t");
        target.register("COUNT", &COUNT, ConfigValue::new("Count", "c.cfg"));
        let mut manager = ConfigManager::new(Arc::new(mock), ConfigOptions::default());
        manager.init("d", &[&target]);

        // Act: a registration added after init is not picked up by refresh
        static LATE: Setting<i64> = Setting::new(5);
        target.register("LATE", &LATE, ConfigValue::new("Late", "c.cfg"));
        COUNT.set(42);
        let report = manager.refresh();

        // Assert
        assert!(report.is_clean());
        assert_eq!(report.written, 1);
        let doc = manager.store().get("c.cfg").unwrap();
        assert_eq!(doc.value("Count"), Some(&TypedValue::Integer(42)));
        assert!(!doc.contains_key("Late"));
    }

    #[test]
    fn test_sync_documents_does_not_write() {
        static V: Setting<u8> = Setting::new(1);
        let mut mock = MockDocumentRepository::new();
        mock.expect_create_dir_all().returning(|_| Ok(()));
        mock.expect_list_files().returning(|_| Ok(Vec::new()));
        mock.expect_write().times(1).returning(|_, _| Ok(()));
        let mut target = ScanTarget::new("t");
        target.register("V", &V, ConfigValue::new("V", "v.cfg"));
        let mut manager = ConfigManager::new(Arc::new(mock), ConfigOptions::default());
        manager.init("d", &[&target]);

        V.set(2);
        let (written, failures) = manager.sync_documents();

        assert_eq!(written, 1);
        assert!(failures.is_empty());
        assert_eq!(
            manager.store().get("v.cfg").unwrap().value("V"),
            Some(&TypedValue::Integer(2))
        );
    }

    #[test]
    fn test_refresh_reports_write_failure() {
        static W: Setting<bool> = Setting::new(true);
        let mut mock = MockDocumentRepository::new();
        mock.expect_create_dir_all().returning(|_| Ok(()));
        mock.expect_list_files().returning(|_| Ok(Vec::new()));
        mock.expect_write()
            .returning(|_, _| Err(io::Error::new(io::ErrorKind::Other, "disk full")));
        let mut target = ScanTarget::new("t");
        target.register("W", &W, ConfigValue::new("W", "w.cfg"));
        let mut manager = ConfigManager::new(Arc::new(mock), ConfigOptions::default());

        let init = manager.init("d", &[&target]);
        let refresh = manager.refresh();

        assert_eq!(init.store_failures.len(), 1);
        assert_eq!(refresh.store_failures.len(), 1);
        assert_eq!(refresh.written, 1);
    }
}
