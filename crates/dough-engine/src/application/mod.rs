//! Application layer of the config subsystem.
//!
//! # What lives here? (for beginners)
//!
//! Everything that decides *what* happens to configuration, without touching
//! the file system directly.  File access goes through the
//! [`store::DocumentRepository`] trait, so each use case can be tested with a
//! mock repository.
//!
//! # Sub-modules
//!
//! - **`scan`**    – Registration tables ([`scan::ScanTarget`]) and the
//!   validated [`scan::DescriptorRegistry`].
//!
//! - **`bind`**    – Reconciles one descriptor with its document: load the
//!   stored value, or write the default through.
//!
//! - **`store`**   – Loads a whole config directory into memory and saves it
//!   back, isolating per-file failures.
//!
//! - **`manager`** – [`manager::ConfigManager`], which sequences the above
//!   into `init` and `refresh`.
//!
//! - **`options`** – Knobs for the subsystem itself.

pub mod bind;
pub mod manager;
pub mod options;
pub mod scan;
pub mod store;
