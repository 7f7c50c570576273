//! Logging collaborator: a `tracing` subscriber whose filter follows the
//! engine's `LogEnabled` / `LogLevel` settings.
//!
//! The subscriber has to exist before `init_config` runs (so the loader can
//! log), but the settings that control it are only known afterwards.  The
//! filter therefore sits behind a [`reload`] layer: [`init_logging`] installs
//! it with the `RUST_LOG` / `info` default, and
//! [`LoggingHandle::apply`] swaps it once the settings are bound.
//!
//! `RUST_LOG` always wins when it is set.

use tracing_subscriber::{
    fmt, prelude::*, reload, util::TryInitError, EnvFilter, Registry,
};

/// Filter used before settings are bound and for invalid levels.
pub const DEFAULT_LEVEL: &str = "info";

/// Error returned by [`LoggingHandle::apply`].
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter \"{directive}\": {source}")]
    InvalidFilter {
        directive: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("failed to swap log filter: {0}")]
    Reload(#[from] reload::Error),
}

/// Handle to the installed subscriber's filter.
pub struct LoggingHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    env_override: bool,
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns [`TryInitError`] if a global subscriber is already installed.
pub fn init_logging() -> Result<LoggingHandle, TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().ok();
    let env_override = env_filter.is_some();
    let filter = env_filter.unwrap_or_else(|| EnvFilter::new(DEFAULT_LEVEL));

    let (filter, handle) = reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init()?;

    Ok(LoggingHandle {
        filter: handle,
        env_override,
    })
}

/// Turns the two logging settings into an `EnvFilter` directive.
///
/// Disabled logging maps to `off`; a blank level maps to [`DEFAULT_LEVEL`].
pub fn filter_directive(enabled: bool, level: &str) -> String {
    if !enabled {
        return "off".to_string();
    }
    let level = level.trim();
    if level.is_empty() {
        DEFAULT_LEVEL.to_string()
    } else {
        level.to_ascii_lowercase()
    }
}

impl LoggingHandle {
    /// `true` when `RUST_LOG` was set at start-up; [`apply`](Self::apply)
    /// is then a no-op.
    pub fn env_override(&self) -> bool {
        self.env_override
    }

    /// Replaces the active filter with one built from the settings.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::InvalidFilter`] for a level `EnvFilter` cannot
    /// parse (the previous filter stays active), or
    /// [`LoggingError::Reload`] if the subscriber is gone.
    pub fn apply(&self, enabled: bool, level: &str) -> Result<(), LoggingError> {
        if self.env_override {
            return Ok(());
        }
        let directive = filter_directive(enabled, level);
        let filter = EnvFilter::try_new(&directive)
            .map_err(|source| LoggingError::InvalidFilter { directive, source })?;
        self.filter.reload(filter)?;
        Ok(())
    }
}
