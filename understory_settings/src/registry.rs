// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Name-based key lookup.
//!
//! [`SettingKey`]s are compared by identity, so components that only know a
//! setting by name need a place to find the shared key. [`KeyRegistry`] is that
//! place; it checks the requested value type on lookup.

use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::any::{Any, type_name};

use hashbrown::HashMap;

use crate::error::SettingsError;
use crate::key::SettingKey;

struct Registration {
    name: &'static str,
    type_name: &'static str,
    key: Box<dyn Any>,
}

/// A registry mapping setting names to their keys.
///
/// # Example
///
/// ```rust
/// use understory_settings::{KeyRegistry, SettingKey, Settings, SettingsError};
///
/// let tab_height: SettingKey<u32> = SettingKey::builder("tab.height").default_value(24).build();
///
/// let mut registry = KeyRegistry::new();
/// registry.register(&tab_height).unwrap();
///
/// let found = registry.lookup::<u32>("tab.height").unwrap();
/// assert_eq!(found, tab_height);
///
/// assert!(matches!(
///     registry.lookup::<f64>("tab.height"),
///     Err(SettingsError::TypeMismatch { .. })
/// ));
/// ```
#[derive(Default)]
pub struct KeyRegistry {
    registrations: Vec<Registration>,
    by_name: HashMap<&'static str, usize>,
}

impl KeyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `key` under its name.
    ///
    /// Fails with [`SettingsError::DuplicateKey`] if the name is taken, even
    /// when the same key is registered twice.
    pub fn register<T: 'static>(&mut self, key: &SettingKey<T>) -> Result<(), SettingsError> {
        let name = key.name();
        if self.by_name.contains_key(name) {
            return Err(SettingsError::DuplicateKey { name });
        }
        self.by_name.insert(name, self.registrations.len());
        self.registrations.push(Registration {
            name,
            type_name: type_name::<T>(),
            key: Box::new(key.clone()),
        });
        Ok(())
    }

    /// Looks up the key registered under `name`.
    pub fn lookup<T: 'static>(&self, name: &str) -> Result<SettingKey<T>, SettingsError> {
        let registration = self
            .by_name
            .get(name)
            .map(|&idx| &self.registrations[idx])
            .ok_or_else(|| SettingsError::UnknownKey {
                name: name.to_string(),
            })?;
        registration
            .key
            .downcast_ref::<SettingKey<T>>()
            .cloned()
            .ok_or(SettingsError::TypeMismatch {
                name: registration.name,
                expected: type_name::<T>(),
                found: registration.type_name,
            })
    }

    /// Returns `true` if a key is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Returns the value type name of the key registered under `name`.
    #[must_use]
    pub fn type_name_of(&self, name: &str) -> Option<&'static str> {
        self.by_name
            .get(name)
            .map(|&idx| self.registrations[idx].type_name)
    }

    /// Returns the number of registered keys.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns `true` if no keys are registered.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Returns the registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.registrations.iter().map(|r| r.name)
    }
}

impl core::fmt::Debug for KeyRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeyRegistry")
            .field("count", &self.registrations.len())
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
