//! Process-wide config manager.
//!
//! Hosts normally do not hold a [`ConfigManager`] themselves.  They call
//! [`init_config`] once on their bootstrap thread and
//! [`refresh_config_values`] whenever they want in-memory changes to become
//! durable.  Both go through one `Mutex`-guarded manager backed by the local
//! disk, so calls from different threads are serialised.
//!
//! ```rust,no_run
//! use dough_engine::{engine, runtime};
//!
//! let engine_target = engine::engine_target();
//! let report = runtime::init_config(runtime::DEFAULT_CONFIG_DIR, &[&engine_target]);
//! assert!(report.aborted.is_none());
//!
//! engine::FULLSCREEN.set(true);
//! runtime::refresh_config_values();
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::application::manager::{ConfigManager, InitReport, RefreshReport};
use crate::application::options::ConfigOptions;
use crate::application::scan::ScanTarget;
use crate::infrastructure::storage::fs::FsDocumentRepository;

pub use dough_core::DEFAULT_CONFIG_DIR;

static MANAGER: OnceLock<Mutex<ConfigManager>> = OnceLock::new();

/// Locks the process-wide manager, creating it on first use.
///
/// A panic while the lock was held does not disable configuration: the
/// poisoned guard is recovered.
pub fn manager() -> MutexGuard<'static, ConfigManager> {
    MANAGER
        .get_or_init(|| {
            Mutex::new(ConfigManager::new(
                Arc::new(FsDocumentRepository::new()),
                ConfigOptions::default(),
            ))
        })
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Replaces the options used by subsequent [`init_config`] calls.
pub fn configure(options: ConfigOptions) {
    manager().set_options(Arc::new(FsDocumentRepository::new()), options);
}

/// Loads `directory`, binds every setting registered in `targets` and writes
/// missing keys back.  See [`ConfigManager::init`].
pub fn init_config(directory: impl AsRef<Path>, targets: &[&ScanTarget]) -> InitReport {
    manager().init(directory, targets)
}

/// Persists the current value of every setting bound by the last
/// [`init_config`].  See [`ConfigManager::refresh`].
pub fn refresh_config_values() -> RefreshReport {
    manager().refresh()
}

/// Directory used by the last [`init_config`].
pub fn config_directory() -> PathBuf {
    manager().config_directory().to_path_buf()
}
