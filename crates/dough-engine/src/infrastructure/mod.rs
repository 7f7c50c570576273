//! Infrastructure layer for the config subsystem.
//!
//! Contains the OS-facing adapters: the file-system document repository and
//! the `tracing` subscriber driven by the engine's own settings.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `dough_core`, but MUST NOT be imported by the `application` layer.

pub mod logging;
pub mod storage;
