//! Descriptor discovery: scan targets and the descriptor registry.
//!
//! Rust has no runtime reflection over `static` items, so discovery works
//! from an explicit registration table.  Each module (the engine, the host
//! application, a plugin) builds a [`ScanTarget`] listing its settings:
//!
//! ```rust
//! use dough_core::{ConfigValue, Setting};
//! use dough_engine::application::scan::{DescriptorRegistry, ScanTarget};
//!
//! static MAX_FPS: Setting<u32> = Setting::new(60);
//!
//! let mut target = ScanTarget::new("doughbox");
//! target.register(
//!     "MAX_FPS",
//!     &MAX_FPS,
//!     ConfigValue::new("MaxFps", "Doughbox.cfg").default_value(144_u32),
//! );
//!
//! let mut registry = DescriptorRegistry::new();
//! let rejected = registry.scan(&target);
//! assert!(rejected.is_empty());
//! assert_eq!(registry.len(), 1);
//! ```
//!
//! # Validation (for beginners)
//!
//! Registration accepts anything that type-checks; the scan then decides
//! which registrations become descriptors.  A registration is rejected, with
//! an error logged and the scan carrying on, when:
//!
//! - its declared default is not exactly the setting's type
//!   (`1280_i32` for a `Setting<u32>`);
//! - the setting is owned by an object instead of being process-wide;
//! - another accepted descriptor already uses the same `(file, name)` key.

use std::sync::Arc;

use dough_core::{Binding, BoundSetting, ConfigDescriptor, ConfigType, ConfigValue};
use thiserror::Error;
use tracing::{debug, error};

/// Reason a registration was not accepted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The declared default has a different type than the setting.
    #[error("setting type and default value type do not match: member \"{member}\" in \"{target}\" is {expected}, default is {found}")]
    DefaultTypeMismatch {
        target: String,
        member: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The setting is not process-wide.
    #[error("setting must be process-wide: member \"{member}\" in \"{target}\"")]
    NotProcessWide { target: String, member: String },

    /// Another descriptor already owns this key.
    #[error("key \"{name}\" in {file} is already bound to \"{existing}\"; member \"{member}\" in \"{target}\" skipped")]
    DuplicateKey {
        target: String,
        member: String,
        file: String,
        name: String,
        existing: String,
    },
}

struct Registration {
    member: String,
    attribute: ConfigValue,
    binding: Arc<dyn BoundSetting>,
}

/// Registration table for one module's settings.
pub struct ScanTarget {
    name: String,
    registrations: Vec<Registration>,
}

impl ScanTarget {
    /// Creates an empty table.  `name` appears in validation messages.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registrations: Vec::new(),
        }
    }

    /// Registers a setting under `member` with its declaration.
    pub fn register<T: ConfigType>(
        &mut self,
        member: impl Into<String>,
        binding: impl Into<Binding<T>>,
        attribute: ConfigValue,
    ) -> &mut Self {
        let binding: Arc<dyn BoundSetting> = Arc::new(binding.into());
        self.registrations.push(Registration {
            member: member.into(),
            attribute,
            binding,
        });
        self
    }

    /// Name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of registrations, accepted or not.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

/// Accepted descriptors, in discovery order.
#[derive(Default)]
pub struct DescriptorRegistry {
    descriptors: Vec<ConfigDescriptor>,
}

impl DescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every registration of `target` and appends the accepted
    /// ones.  Returns the rejections; each has already been logged.
    pub fn scan(&mut self, target: &ScanTarget) -> Vec<ValidationError> {
        let mut rejected = Vec::new();

        for reg in &target.registrations {
            match self.validate(target, reg) {
                Ok(()) => {
                    let descriptor = ConfigDescriptor::new(
                        reg.member.clone(),
                        reg.attribute.clone(),
                        Arc::clone(&reg.binding),
                    );
                    debug!(
                        target_name = %target.name,
                        member = %descriptor.member,
                        file = %descriptor.file,
                        key = %descriptor.name,
                        value_type = %descriptor.value_type,
                        "config descriptor accepted"
                    );
                    self.descriptors.push(descriptor);
                }
                Err(e) => {
                    error!("{e}");
                    rejected.push(e);
                }
            }
        }
        rejected
    }

    fn validate(&self, target: &ScanTarget, reg: &Registration) -> Result<(), ValidationError> {
        if let Some(default) = &reg.attribute.default {
            if !reg.binding.accepts_default(default) {
                return Err(ValidationError::DefaultTypeMismatch {
                    target: target.name.clone(),
                    member: reg.member.clone(),
                    expected: reg.binding.value_type().name(),
                    found: default.type_name(),
                });
            }
        }

        if !reg.binding.is_process_wide() {
            return Err(ValidationError::NotProcessWide {
                target: target.name.clone(),
                member: reg.member.clone(),
            });
        }

        if let Some(existing) = self.get(&reg.attribute.file, &reg.attribute.name) {
            return Err(ValidationError::DuplicateKey {
                target: target.name.clone(),
                member: reg.member.clone(),
                file: reg.attribute.file.clone(),
                name: reg.attribute.name.clone(),
                existing: existing.member.clone(),
            });
        }

        Ok(())
    }

    /// Returns the descriptor bound to `(file, name)`.
    pub fn get(&self, file: &str, name: &str) -> Option<&ConfigDescriptor> {
        self.descriptors.iter().find(|d| d.same_key(file, name))
    }

    /// Iterates descriptors in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Forgets every descriptor.
    pub fn clear(&mut self) {
        self.descriptors.clear();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
