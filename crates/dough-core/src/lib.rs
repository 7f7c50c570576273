//! # dough-core
//!
//! Shared library for Dough's persisted runtime configuration: typed values,
//! process-wide setting slots, descriptor declarations, in-memory documents,
//! and the text codec used for `.cfg` files.
//!
//! This crate never touches the file system.  Loading, binding and saving are
//! orchestrated by `dough-engine`.
//!
//! # Architecture overview (for beginners)
//!
//! A host program declares *settings*: `static` cells whose values should
//! survive restarts.  Each setting is registered together with a
//! *declaration* naming the key and the file it lives in.  At startup the
//! engine reads every config file into a *document*, then reconciles each
//! setting with its document: stored values win, missing keys are written
//! back using the declared default.
//!
//! - **`domain`** – The vocabulary of the subsystem.  [`Setting`] is the typed
//!   slot, [`ConfigValue`] the declaration, [`ConfigDescriptor`] the accepted
//!   registration, and [`ConfigDocument`] / [`ConfigStore`] the in-memory
//!   contents of the config directory.
//!
//! - **`format`** – How a document becomes text and back.  Files are TOML
//!   with one top-level key per setting and per-key comments.

pub mod domain;
pub mod format;

/// Directory used when the host does not pass one explicitly.
pub const DEFAULT_CONFIG_DIR: &str = "Config/";

/// Extension recognised as a config file when no allow-list is configured.
pub const DEFAULT_CONFIG_EXTENSION: &str = ".cfg";

// Re-export the most-used types at the crate root so callers can write
// `dough_core::Setting` instead of `dough_core::domain::setting::Setting`.
pub use domain::descriptor::{Binding, BoundSetting, ConfigDescriptor, ConfigValue, DeclaredDefault};
pub use domain::document::{ConfigDocument, ConfigEntry, ConfigStore, Trivia};
pub use domain::setting::Setting;
pub use domain::value::{CoercionError, ConfigType, TypeTag, TypedValue};
pub use format::codec::{parse_document, serialize_document, FormatError};
