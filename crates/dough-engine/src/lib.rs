//! dough-engine library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the `doughbox` binary share the same module tree.
//!
//! - **`application`**    – scan, bind, document store and the
//!   [`ConfigManager`] that sequences them.
//! - **`infrastructure`** – file-system repository and logging.
//! - **`engine`**         – the engine's own settings.
//! - **`runtime`**        – process-wide `init_config` / `refresh_config_values`.

pub mod application;
pub mod engine;
pub mod infrastructure;
pub mod runtime;

pub use application::manager::{ConfigManager, InitReport, RefreshReport};
pub use application::options::ConfigOptions;
pub use application::scan::{DescriptorRegistry, ScanTarget, ValidationError};
pub use runtime::{init_config, refresh_config_values};
