//! Value representation and type coercion.
//!
//! Config files hold loosely typed TOML values; settings are strongly typed
//! Rust values.  This module is the bridge between the two:
//!
//! - [`TypedValue`] is the document-side representation (a `toml::Value`).
//! - [`ConfigType`] is implemented by every Rust type that may back a
//!   setting.  It is a blanket impl over `serde`, so booleans, integers,
//!   strings, vectors and `#[derive(Serialize, Deserialize, Default)]`
//!   structs all qualify without extra code.
//!
//! # Why `Default` is part of the contract
//!
//! When a setting has neither a stored value nor a declared default and was
//! never given an initial value, the binder synthesises an empty instance of
//! the declared type.  `Default::default()` is that empty instance.

use std::any::{type_name, TypeId};
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// A value as stored in a config document.
pub type TypedValue = toml::Value;

/// Runtime identity of a setting's declared Rust type.
///
/// Two tags are equal exactly when they describe the same type; the name is
/// carried only for log messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Returns the tag for `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Returns the underlying [`TypeId`].
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the fully qualified type name, e.g. `alloc::string::String`.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Error raised when a value cannot cross the typed/untyped boundary.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoercionError {
    /// A stored value does not fit the setting's declared type.
    #[error("cannot read {found} value as {expected}: {reason}")]
    FromValue {
        expected: &'static str,
        found: &'static str,
        reason: String,
    },

    /// An in-memory value has no TOML representation (e.g. `None`, or an
    /// unsigned integer above `i64::MAX`).
    #[error("cannot represent {type_name} as a config value: {reason}")]
    ToValue {
        type_name: &'static str,
        reason: String,
    },
}

/// A Rust type that can back a configuration setting.
///
/// Implemented automatically for every type that is serde-serialisable,
/// deserialisable, defaultable and cheaply shareable across threads.
pub trait ConfigType: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static {
    /// Returns the runtime tag for this type.
    fn type_tag() -> TypeTag {
        TypeTag::of::<Self>()
    }

    /// Wraps the value as a [`TypedValue`].
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError::ToValue`] if the value has no TOML
    /// representation.
    fn to_value(&self) -> Result<TypedValue, CoercionError> {
        TypedValue::try_from(self).map_err(|e| CoercionError::ToValue {
            type_name: type_name::<Self>(),
            reason: e.to_string(),
        })
    }

    /// Coerces a stored [`TypedValue`] into this type.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError::FromValue`] if the value's shape does not
    /// match the type (wrong primitive, missing struct field, out of range).
    fn from_value(value: &TypedValue) -> Result<Self, CoercionError> {
        value
            .clone()
            .try_into::<Self>()
            .map_err(|e| CoercionError::FromValue {
                expected: type_name::<Self>(),
                found: value.type_str(),
                reason: e.to_string(),
            })
    }
}

impl<T> ConfigType for T where T: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static
{}

// ── Tests ─────────────────────────────────────────────────────────────────────
