//! Config file text format.
//!
//! - **`codec`** – [`parse_document`](codec::parse_document) and
//!   [`serialize_document`](codec::serialize_document): TOML text ↔
//!   [`ConfigDocument`](crate::ConfigDocument), with per-key comments.

pub mod codec;

pub use codec::{parse_document, serialize_document, FormatError};
