//! Declarations, bindings and accepted descriptors.
//!
//! A host registers each setting with a [`ConfigValue`] declaration:
//!
//! ```rust
//! use dough_core::{Binding, ConfigValue, Setting};
//!
//! static VSYNC: Setting<bool> = Setting::unset();
//!
//! let declaration = ConfigValue::new("VSync", "EngineVideo.cfg")
//!     .comment("Synchronise presentation with the display refresh rate")
//!     .default_value(true);
//! let binding: Binding<bool> = (&VSYNC).into();
//! assert!(binding.is_process_wide());
//! # let _ = declaration;
//! ```
//!
//! The declaration's default is deliberately untyped (it is whatever value
//! the host wrote next to the key name), so a default of the wrong type can
//! be declared and is rejected when the engine scans the registration.
//! Accepted registrations become [`ConfigDescriptor`]s, which own a
//! type-erased handle ([`BoundSetting`]) onto the setting.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::domain::setting::Setting;
use crate::domain::value::{CoercionError, ConfigType, TypeTag, TypedValue};

// ── Declaration ───────────────────────────────────────────────────────────────

/// A default value attached to a declaration, type-erased.
#[derive(Clone)]
pub struct DeclaredDefault {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl DeclaredDefault {
    /// Wraps `value` as a declared default.
    pub fn new<V: Any + Send + Sync>(value: V) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<V>(),
        }
    }

    /// Returns the default as `&V` if it was declared with exactly type `V`.
    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        self.value.downcast_ref::<V>()
    }

    /// Name of the type the default was declared with.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for DeclaredDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclaredDefault")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Metadata attached to a configurable variable.
#[derive(Debug, Clone)]
pub struct ConfigValue {
    /// Key of the value inside its document.
    pub name: String,
    /// File the value is stored in, **including** the extension.
    pub file: String,
    /// Comment written next to the key.  Useful for describing what a value
    /// does; a comment edited by the user in the file takes precedence.
    pub comment: Option<String>,
    /// Value assigned to the variable when its key is missing from the file.
    ///
    /// Without one, the variable keeps its initial value, or receives
    /// `T::default()` if it never had one.
    pub default: Option<DeclaredDefault>,
}

impl ConfigValue {
    /// Declares key `name` stored in `file`.
    pub fn new(name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            comment: None,
            default: None,
        }
    }

    /// Attaches a comment.  Empty comments are ignored.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        let comment = comment.into();
        self.comment = (!comment.is_empty()).then_some(comment);
        self
    }

    /// Attaches a default value.
    pub fn default_value<V: Any + Send + Sync>(mut self, value: V) -> Self {
        self.default = Some(DeclaredDefault::new(value));
        self
    }
}

// ── Binding ───────────────────────────────────────────────────────────────────

/// The variable a declaration is attached to.
pub enum Binding<T: 'static> {
    /// A `static` setting: one instance for the whole process.
    Static(&'static Setting<T>),
    /// A setting owned by some object.  Such bindings are not accepted by
    /// the scanner because their lifetime is tied to the owner.
    Instance(Arc<Setting<T>>),
}

impl<T: 'static> Binding<T> {
    /// Returns the bound setting.
    pub fn setting(&self) -> &Setting<T> {
        match self {
            Binding::Static(s) => s,
            Binding::Instance(s) => s,
        }
    }

    /// `true` for process-wide bindings.
    pub fn is_process_wide(&self) -> bool {
        matches!(self, Binding::Static(_))
    }
}

impl<T: 'static> Clone for Binding<T> {
    fn clone(&self) -> Self {
        match self {
            Binding::Static(s) => Binding::Static(*s),
            Binding::Instance(s) => Binding::Instance(Arc::clone(s)),
        }
    }
}

impl<T: 'static> From<&'static Setting<T>> for Binding<T> {
    fn from(setting: &'static Setting<T>) -> Self {
        Binding::Static(setting)
    }
}

impl<T: 'static> From<Arc<Setting<T>>> for Binding<T> {
    fn from(setting: Arc<Setting<T>>) -> Self {
        Binding::Instance(setting)
    }
}

/// Type-erased operations the binder needs on a bound setting.
pub trait BoundSetting: Send + Sync {
    /// Declared type of the setting.
    fn value_type(&self) -> TypeTag;

    /// `true` if the setting lives for the whole process.
    fn is_process_wide(&self) -> bool;

    /// `true` if `default` was declared with exactly the setting's type.
    fn accepts_default(&self, default: &DeclaredDefault) -> bool;

    /// Assigns `default` to the setting.  Returns `false` (and leaves the
    /// setting untouched) if the default has a different type.
    fn assign_default(&self, default: &DeclaredDefault) -> bool;

    /// Assigns `T::default()` if the setting has never been given a value.
    fn fill_if_unset(&self) -> bool;

    /// Coerces `value` to the setting's type and stores it.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError`] and leaves the setting untouched if the
    /// value does not fit.
    fn load(&self, value: &TypedValue) -> Result<(), CoercionError>;

    /// Wraps the setting's current value.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError`] if the value has no document representation.
    fn snapshot(&self) -> Result<TypedValue, CoercionError>;
}

impl<T: ConfigType> BoundSetting for Binding<T> {
    fn value_type(&self) -> TypeTag {
        T::type_tag()
    }

    fn is_process_wide(&self) -> bool {
        Binding::is_process_wide(self)
    }

    fn accepts_default(&self, default: &DeclaredDefault) -> bool {
        default.downcast_ref::<T>().is_some()
    }

    fn assign_default(&self, default: &DeclaredDefault) -> bool {
        match default.downcast_ref::<T>() {
            Some(value) => {
                self.setting().set(value.clone());
                true
            }
            None => false,
        }
    }

    fn fill_if_unset(&self) -> bool {
        self.setting().set_if_unset(T::default)
    }

    fn load(&self, value: &TypedValue) -> Result<(), CoercionError> {
        let typed = T::from_value(value)?;
        self.setting().set(typed);
        Ok(())
    }

    fn snapshot(&self) -> Result<TypedValue, CoercionError> {
        self.setting().get().to_value()
    }
}

// ── Descriptor ────────────────────────────────────────────────────────────────

/// An accepted registration: declaration metadata plus its bound setting.
///
/// Identity is the `(file, name)` pair.  Descriptors are created by the scan
/// pass and never change afterwards; only the setting they point to does.
#[derive(Clone)]
pub struct ConfigDescriptor {
    /// Key inside the document.
    pub name: String,
    /// File name including extension.
    pub file: String,
    /// Comment written next to the key.
    pub comment: Option<String>,
    /// Declared default, already validated against `value_type`.
    pub default: Option<DeclaredDefault>,
    /// Declared type of the bound setting.
    pub value_type: TypeTag,
    /// Name the host registered the setting under (for diagnostics).
    pub member: String,
    binding: Arc<dyn BoundSetting>,
}

impl ConfigDescriptor {
    /// Assembles a descriptor.  Validation is the scanner's job; this only
    /// records what it is given.
    pub fn new(member: impl Into<String>, attribute: ConfigValue, binding: Arc<dyn BoundSetting>) -> Self {
        Self {
            name: attribute.name,
            file: attribute.file,
            comment: attribute.comment,
            default: attribute.default,
            value_type: binding.value_type(),
            member: member.into(),
            binding,
        }
    }

    /// Type-erased handle onto the bound setting.
    pub fn binding(&self) -> &dyn BoundSetting {
        self.binding.as_ref()
    }

    /// Returns `true` if this descriptor has the same `(file, name)` identity.
    pub fn same_key(&self, file: &str, name: &str) -> bool {
        self.file == file && self.name == name
    }
}

impl fmt::Debug for ConfigDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigDescriptor")
            .field("name", &self.name)
            .field("file", &self.file)
            .field("comment", &self.comment)
            .field("default", &self.default)
            .field("value_type", &self.value_type)
            .field("member", &self.member)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_value_builder_sets_fields() {
        let cv = ConfigValue::new("Width", "EngineVideo.cfg")
            .comment("Window width")
            .default_value(1280_u32);
        assert_eq!(cv.name, "Width");
        assert_eq!(cv.file, "EngineVideo.cfg");
        assert_eq!(cv.comment.as_deref(), Some("Window width"));
        assert_eq!(cv.default.unwrap().downcast_ref::<u32>(), Some(&1280));
    }

    #[test]
    fn test_empty_comment_is_dropped() {
        let cv = ConfigValue::new("A", "a.cfg").comment("");
        assert!(cv.comment.is_none());
    }

    #[test]
    fn test_default_type_must_match_exactly() {
        // Arrange: an i32 literal is not a u32
        static WIDTH: Setting<u32> = Setting::new(0);
        let binding: Binding<u32> = (&WIDTH).into();
        let wrong = DeclaredDefault::new(1280_i32);
        let right = DeclaredDefault::new(1280_u32);

        // Act / Assert
        assert!(!binding.accepts_default(&wrong));
        assert!(binding.accepts_default(&right));
        assert!(!binding.assign_default(&wrong));
        assert_eq!(WIDTH.get(), 0);
    }

    #[test]
    fn test_instance_binding_is_not_process_wide() {
        let owned = Arc::new(Setting::new(false));
        let binding: Binding<bool> = Arc::clone(&owned).into();
        assert!(!BoundSetting::is_process_wide(&binding));
    }

    #[test]
    fn test_load_failure_leaves_setting_untouched() {
        static RETRIES: Setting<u8> = Setting::new(3);
        let binding: Binding<u8> = (&RETRIES).into();

        let result = binding.load(&TypedValue::String("many".to_string()));

        assert!(result.is_err());
        assert_eq!(RETRIES.get(), 3);
    }

    #[test]
    fn test_fill_if_unset_materialises_default() {
        static NAMES: Setting<Vec<String>> = Setting::unset();
        let binding: Binding<Vec<String>> = (&NAMES).into();

        assert!(binding.fill_if_unset());
        assert!(NAMES.is_set());
        assert_eq!(binding.snapshot().unwrap(), TypedValue::Array(Vec::new()));
    }

    #[test]
    fn test_descriptor_takes_value_type_from_binding() {
        static LEVEL: Setting<String> = Setting::unset();
        let binding: Arc<dyn BoundSetting> = Arc::new(Binding::from(&LEVEL));
        let d = ConfigDescriptor::new("LEVEL", ConfigValue::new("LogLevel", "EngineCore.cfg"), binding);
        assert_eq!(d.value_type, TypeTag::of::<String>());
        assert!(d.same_key("EngineCore.cfg", "LogLevel"));
        assert!(!d.same_key("EngineVideo.cfg", "LogLevel"));
    }
}
