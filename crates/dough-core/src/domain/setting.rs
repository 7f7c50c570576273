//! Typed, process-wide setting slots.
//!
//! A [`Setting`] is the variable a config key is bound to.  Settings are meant
//! to be declared as `static` items so there is exactly one instance per
//! process:
//!
//! ```rust
//! use dough_core::Setting;
//!
//! static FULLSCREEN: Setting<bool> = Setting::new(false);
//! static WINDOW_TITLE: Setting<String> = Setting::unset();
//!
//! assert!(!FULLSCREEN.get());
//! FULLSCREEN.set(true);
//! assert!(FULLSCREEN.get());
//! assert!(!WINDOW_TITLE.is_set());
//! ```
//!
//! The value sits behind an `RwLock`, so reading a setting from worker
//! threads is safe; readers see whatever the last writer stored.

use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A configurable value with getter/setter indirection.
///
/// `None` inside the slot means "no initial value was declared".  Reading an
/// unset slot yields `T::default()`; the binder materialises that default
/// into the slot the first time the setting is bound.
pub struct Setting<T> {
    value: RwLock<Option<T>>,
}

impl<T> Setting<T> {
    /// Creates a setting with a compile-time initial value.
    pub const fn new(value: T) -> Self {
        Self {
            value: RwLock::new(Some(value)),
        }
    }

    /// Creates a setting without an initial value.
    pub const fn unset() -> Self {
        Self {
            value: RwLock::new(None),
        }
    }

    /// Returns `true` once the slot holds a value.
    pub fn is_set(&self) -> bool {
        self.read().is_some()
    }

    /// Replaces the current value.
    pub fn set(&self, value: T) {
        *self.write() = Some(value);
    }

    /// Stores `value` only if the slot is still unset.
    ///
    /// Returns `true` if the value was stored.
    pub fn set_if_unset(&self, value: impl FnOnce() -> T) -> bool {
        let mut slot = self.write();
        if slot.is_some() {
            return false;
        }
        *slot = Some(value());
        true
    }

    // A panicking writer cannot leave a half-written `Option<T>` behind, so a
    // poisoned lock still guards a consistent value.
    fn read(&self) -> RwLockReadGuard<'_, Option<T>> {
        self.value.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<T>> {
        self.value.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone + Default> Setting<T> {
    /// Returns a copy of the current value, or `T::default()` while unset.
    pub fn get(&self) -> T {
        self.read().clone().unwrap_or_default()
    }

    /// Mutates the value in place.  An unset slot starts from `T::default()`.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut slot = self.write();
        f(slot.get_or_insert_with(T::default));
    }
}

impl<T: fmt::Debug> fmt::Debug for Setting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setting").field("value", &*self.read()).finish()
    }
}

impl<T: Default> Default for Setting<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_setting_returns_initial_value() {
        let s = Setting::new(42_i64);
        assert!(s.is_set());
        assert_eq!(s.get(), 42);
    }

    #[test]
    fn test_unset_setting_reads_as_default() {
        let s: Setting<String> = Setting::unset();
        assert!(!s.is_set());
        assert_eq!(s.get(), "");
    }

    #[test]
    fn test_set_replaces_value() {
        let s = Setting::new(1_u32);
        s.set(2);
        assert_eq!(s.get(), 2);
    }

    #[test]
    fn test_set_if_unset_only_fills_empty_slot() {
        // Arrange
        let empty: Setting<u32> = Setting::unset();
        let full = Setting::new(7_u32);

        // Act
        let filled_empty = empty.set_if_unset(|| 3);
        let filled_full = full.set_if_unset(|| 3);

        // Assert
        assert!(filled_empty);
        assert!(!filled_full);
        assert_eq!(empty.get(), 3);
        assert_eq!(full.get(), 7);
    }

    #[test]
    fn test_update_starts_from_default_when_unset() {
        let s: Setting<Vec<String>> = Setting::unset();
        s.update(|v| v.push("layer".to_string()));
        assert_eq!(s.get(), vec!["layer".to_string()]);
        assert!(s.is_set());
    }

    #[test]
    fn test_static_setting_is_shared_across_threads() {
        static COUNTER: Setting<u64> = Setting::new(0);

        let handles: Vec<_> = (0..4)
            .map(|_| thread::spawn(|| COUNTER.update(|c| *c += 1)))
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(COUNTER.get(), 4);
    }

    #[test]
    fn test_poisoned_lock_still_readable() {
        let s = Arc::new(Setting::new(5_i32));
        let clone = Arc::clone(&s);
        let _ = thread::spawn(move || {
            clone.update(|_| panic!("poison the lock"));
        })
        .join();

        assert_eq!(s.get(), 5);
    }
}
