//! Domain entities for Dough configuration.
//!
//! Everything in here is plain data plus the rules that govern it.  There is
//! no I/O: documents are produced and consumed by the engine's document
//! store, which lives in an outer layer.
//!
//! # How the pieces relate
//!
//! ```text
//! Setting<T>  ◄── Binding<T> ──┐
//!                              ├── ConfigDescriptor ──► ConfigStore[file][name]
//! ConfigValue (declaration) ───┘
//! ```

/// Declarations, bindings and accepted descriptors.
pub mod descriptor;
/// Documents and the file-name keyed store.
pub mod document;
/// Typed, process-wide setting slots.
pub mod setting;
/// Value representation and type coercion.
pub mod value;
