//! Storage infrastructure: config directory access on the local disk.
//!
//! The `fs` sub-module implements
//! [`DocumentRepository`](crate::application::store::DocumentRepository):
//!
//! - Listing and reading the files of the config directory.
//! - Writing documents atomically (temp file + rename).
//! - Moving malformed files aside and rotating backups.

pub mod fs;
