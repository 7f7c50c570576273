//! Binder: reconciles settings with their documents.
//!
//! [`bind`] runs once per descriptor during `init`:
//!
//! ```text
//! key in document? ──yes──► coerce stored value ──► setting
//!        │
//!        no
//!        ▼
//! declared default? ──yes──► setting = default
//!        │
//!        no ──► setting = T::default() if it never had a value
//!        ▼
//! document[key] = setting's value (+ comment)      ← write-through default
//! ```
//!
//! After a bind pass every descriptor's key is present in its document, so
//! the next run always takes the first branch.
//!
//! [`write_back`] runs during `refresh`: it copies the setting's current
//! value into the document unconditionally.

use dough_core::{CoercionError, ConfigDescriptor, ConfigEntry, ConfigStore};
use thiserror::Error;

/// What [`bind`] did with a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// The stored value was loaded into the setting.
    Loaded,
    /// The key was missing; the resolved value was written into the document.
    Materialized,
}

/// A descriptor whose value could not cross the document boundary.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("config value \"{name}\" in {file}: {source}")]
pub struct BindError {
    pub file: String,
    pub name: String,
    #[source]
    pub source: CoercionError,
}

impl BindError {
    fn new(descriptor: &ConfigDescriptor, source: CoercionError) -> Self {
        Self {
            file: descriptor.file.clone(),
            name: descriptor.name.clone(),
            source,
        }
    }
}

/// Reconciles `descriptor` with its document in `store`.
///
/// # Errors
///
/// Returns [`BindError`] if the stored value does not coerce to the setting's
/// type (the setting keeps its previous value and the document is left
/// as-is), or if the resolved value cannot be represented in a document
/// (nothing is inserted).
pub fn bind(descriptor: &ConfigDescriptor, store: &mut ConfigStore) -> Result<BindOutcome, BindError> {
    let doc = store.ensure_document(&descriptor.file);
    let binding = descriptor.binding();

    if let Some(stored) = doc.value(&descriptor.name) {
        binding
            .load(stored)
            .map_err(|e| BindError::new(descriptor, e))?;
        return Ok(BindOutcome::Loaded);
    }

    match &descriptor.default {
        Some(default) => {
            // The scanner already checked the type, so this cannot miss.
            binding.assign_default(default);
        }
        None => {
            binding.fill_if_unset();
        }
    }

    let value = binding
        .snapshot()
        .map_err(|e| BindError::new(descriptor, e))?;
    doc.put(
        descriptor.name.clone(),
        ConfigEntry::with_comment(value, descriptor.comment.clone()),
    );
    Ok(BindOutcome::Materialized)
}

/// Overwrites the document entry with the setting's current value.
///
/// A comment already present on the entry (possibly edited by the user) is
/// kept, along with its placement and the blank lines around it; otherwise
/// the descriptor's comment is used.
///
/// # Errors
///
/// Returns [`BindError`] if the current value cannot be represented in a
/// document; the entry is left unchanged.
pub fn write_back(descriptor: &ConfigDescriptor, store: &mut ConfigStore) -> Result<(), BindError> {
    let value = descriptor
        .binding()
        .snapshot()
        .map_err(|e| BindError::new(descriptor, e))?;

    let doc = store.ensure_document(&descriptor.file);
    match doc.get_mut(&descriptor.name) {
        Some(entry) => {
            entry.value = value;
            if entry.comment.is_none() {
                entry.comment = descriptor.comment.clone().filter(|c| !c.is_empty());
            }
        }
        None => {
            doc.put(
                descriptor.name.clone(),
                ConfigEntry::with_comment(value, descriptor.comment.clone()),
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::scan::{DescriptorRegistry, ScanTarget};
    use dough_core::{ConfigDocument, ConfigValue, Setting, Trivia, TypedValue};

    /// Scans a single registration and returns its descriptor.
    fn descriptor_for(target: ScanTarget) -> ConfigDescriptor {
        let mut registry = DescriptorRegistry::new();
        assert!(registry.scan(&target).is_empty(), "registration must be valid");
        let descriptor = registry.iter().next().cloned().expect("one descriptor");
        descriptor
    }

    #[test]
    fn test_bind_loads_stored_value() {
        // Arrange
        static VOLUME: Setting<i64> = Setting::new(5);
        let mut t = ScanTarget::new("t");
        t.register("VOLUME", &VOLUME, ConfigValue::new("Volume", "a.cfg").default_value(7_i64));
        let d = descriptor_for(t);
        let mut store = ConfigStore::new();
        store
            .ensure_document("a.cfg")
            .put("Volume", ConfigEntry::new(TypedValue::Integer(11)));

        // Act
        let outcome = bind(&d, &mut store).unwrap();

        // Assert: stored value beats both the initial value and the default
        assert_eq!(outcome, BindOutcome::Loaded);
        assert_eq!(VOLUME.get(), 11);
    }

    #[test]
    fn test_bind_materialises_default_with_comment() {
        // Arrange
        static LEVEL: Setting<String> = Setting::unset();
        let mut t = ScanTarget::new("t");
        t.register(
            "LEVEL",
            &LEVEL,
            ConfigValue::new("LogLevel", "core.cfg")
                .comment("tracing filter")
                .default_value(String::from("info")),
        );
        let d = descriptor_for(t);
        let mut store = ConfigStore::new();

        // Act
        let outcome = bind(&d, &mut store).unwrap();

        // Assert
        assert_eq!(outcome, BindOutcome::Materialized);
        assert_eq!(LEVEL.get(), "info");
        let entry = store.get("core.cfg").unwrap().get("LogLevel").unwrap();
        assert_eq!(entry.value, TypedValue::String("info".to_string()));
        assert_eq!(entry.comment.as_deref(), Some("tracing filter"));
    }

    #[test]
    fn test_bind_without_default_keeps_initial_value() {
        static SPEED: Setting<u32> = Setting::new(3);
        let mut t = ScanTarget::new("t");
        t.register("SPEED", &SPEED, ConfigValue::new("Speed", "s.cfg"));
        let d = descriptor_for(t);
        let mut store = ConfigStore::new();

        bind(&d, &mut store).unwrap();

        assert_eq!(SPEED.get(), 3);
        assert_eq!(store.get("s.cfg").unwrap().value("Speed"), Some(&TypedValue::Integer(3)));
    }

    #[test]
    fn test_bind_without_default_or_initial_value_synthesises_empty_instance() {
        static TAGS: Setting<Vec<String>> = Setting::unset();
        let mut t = ScanTarget::new("t");
        t.register("TAGS", &TAGS, ConfigValue::new("Tags", "s.cfg"));
        let d = descriptor_for(t);
        let mut store = ConfigStore::new();

        bind(&d, &mut store).unwrap();

        assert!(TAGS.is_set());
        assert_eq!(
            store.get("s.cfg").unwrap().value("Tags"),
            Some(&TypedValue::Array(Vec::new()))
        );
    }

    #[test]
    fn test_bind_coercion_failure_keeps_initial_value_and_document() {
        // Arrange
        static RETRIES: Setting<u8> = Setting::new(3);
        let mut t = ScanTarget::new("t");
        t.register("RETRIES", &RETRIES, ConfigValue::new("Retries", "n.cfg"));
        let d = descriptor_for(t);
        let mut store = ConfigStore::new();
        store
            .ensure_document("n.cfg")
            .put("Retries", ConfigEntry::new(TypedValue::String("lots".to_string())));

        // Act
        let err = bind(&d, &mut store).unwrap_err();

        // Assert
        assert_eq!(err.name, "Retries");
        assert_eq!(RETRIES.get(), 3);
        assert_eq!(
            store.get("n.cfg").unwrap().value("Retries"),
            Some(&TypedValue::String("lots".to_string()))
        );
    }

    #[test]
    fn test_bind_unrepresentable_value_is_not_inserted() {
        static MAYBE: Setting<Option<u32>> = Setting::new(None);
        let mut t = ScanTarget::new("t");
        t.register("MAYBE", &MAYBE, ConfigValue::new("Maybe", "m.cfg"));
        let d = descriptor_for(t);
        let mut store = ConfigStore::new();

        let result = bind(&d, &mut store);

        assert!(result.is_err());
        assert!(!store.get("m.cfg").unwrap().contains_key("Maybe"));
    }

    #[test]
    fn test_write_back_overwrites_value_and_keeps_user_comment() {
        // Arrange
        static FPS: Setting<u32> = Setting::new(60);
        let mut t = ScanTarget::new("t");
        t.register("FPS", &FPS, ConfigValue::new("Fps", "v.cfg").comment("declared"));
        let d = descriptor_for(t);
        let mut store = ConfigStore::new();
        let mut doc = ConfigDocument::new();
        doc.put(
            "Fps",
            ConfigEntry::with_comment(TypedValue::Integer(60), Some("edited by user".to_string())),
        );
        store.insert("v.cfg", doc);

        // Act
        FPS.set(144);
        write_back(&d, &mut store).unwrap();

        // Assert
        let entry = store.get("v.cfg").unwrap().get("Fps").unwrap();
        assert_eq!(entry.value, TypedValue::Integer(144));
        assert_eq!(entry.comment.as_deref(), Some("edited by user"));
    }

    #[test]
    fn test_write_back_uses_declared_comment_when_entry_has_none() {
        static ON: Setting<bool> = Setting::new(true);
        let mut t = ScanTarget::new("t");
        t.register("ON", &ON, ConfigValue::new("On", "o.cfg").comment("declared"));
        let d = descriptor_for(t);
        let mut store = ConfigStore::new();

        write_back(&d, &mut store).unwrap();

        let entry = store.get("o.cfg").unwrap().get("On").unwrap();
        assert_eq!(entry.comment.as_deref(), Some("declared"));
    }

    #[test]
    fn test_write_back_keeps_layout_of_existing_entry() {
        // Arrange
        static ZOOM: Setting<u8> = Setting::new(1);
        let mut t = ScanTarget::new("t");
        t.register("ZOOM", &ZOOM, ConfigValue::new("Zoom", "z.cfg"));
        let d = descriptor_for(t);
        let mut entry =
            ConfigEntry::with_comment(TypedValue::Integer(1), Some("über".to_string())).placed_above();
        entry.leading = vec![Trivia::Blank, Trivia::Comment("camera".to_string())];
        let mut doc = ConfigDocument::new();
        doc.put("Zoom", entry);
        let mut store = ConfigStore::new();
        store.insert("z.cfg", doc);

        // Act
        ZOOM.set(3);
        write_back(&d, &mut store).unwrap();

        // Assert
        let entry = store.get("z.cfg").unwrap().get("Zoom").unwrap();
        assert_eq!(entry.value, TypedValue::Integer(3));
        assert_eq!(entry.comment.as_deref(), Some("über"));
        assert!(entry.comment_above);
        assert_eq!(
            entry.leading,
            vec![Trivia::Blank, Trivia::Comment("camera".to_string())]
        );
    }
}
