// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Setting identification types.
//!
//! This module provides [`SettingKey<T>`], a typed handle naming one slot in a
//! [`Settings`] store, and [`SettingKeyBuilder`] for configuring how that slot
//! resolves its default value.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::store::Settings;

/// Resolver producing the default value of a setting.
///
/// The resolver receives the store it is resolving for, so a default may be
/// derived from other settings in the same store.
pub type DefaultResolver<T> = Box<dyn Fn(&Settings) -> Option<T>>;

/// Opaque identity of a [`SettingKey`].
///
/// Two ids are equal only if they were taken from clones of the same key.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct KeyId(usize);

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({:#x})", self.0)
    }
}

/// A typed key for one setting.
///
/// Keys are compared by identity: two keys built separately are never equal,
/// even when they share a name. Cloning a key is cheap and yields a handle to
/// the same identity.
///
/// # Example
///
/// ```rust
/// use understory_settings::{SettingKey, Settings};
///
/// let tab_height: SettingKey<u32> = SettingKey::builder("tab.height")
///     .default_value(24)
///     .build();
///
/// let settings = Settings::new();
/// assert_eq!(settings.get(&tab_height), Some(24));
///
/// // Same name, different key.
/// let other: SettingKey<u32> = SettingKey::new("tab.height");
/// assert_ne!(tab_height, other);
/// assert_eq!(settings.get(&other), None);
/// ```
pub struct SettingKey<T> {
    inner: Rc<KeyData<T>>,
}

struct KeyData<T> {
    name: &'static str,
    default: Option<DefaultResolver<T>>,
    null_replaced_by_default: bool,
}

impl<T: 'static> SettingKey<T> {
    /// Creates a key without a default value.
    ///
    /// Until a value is set, [`Settings::get`] returns `None` for this key.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        SettingKeyBuilder::new(name).build()
    }

    /// Starts building a key with the given name.
    #[must_use]
    pub fn builder(name: &'static str) -> SettingKeyBuilder<T> {
        SettingKeyBuilder::new(name)
    }

    /// Returns the name this key was created with.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Returns whether a stored `None` falls back to the default value.
    ///
    /// When `false`, setting `None` is a deliberate empty value and hides the
    /// default until [`Settings::to_default`] is called.
    #[must_use]
    #[inline]
    pub fn null_replaced_by_default(&self) -> bool {
        self.inner.null_replaced_by_default
    }

    /// Returns whether this key has a default resolver.
    #[must_use]
    #[inline]
    pub fn has_default(&self) -> bool {
        self.inner.default.is_some()
    }

    /// Evaluates the default resolver against `settings`.
    pub(crate) fn resolve_default(&self, settings: &Settings) -> Option<T> {
        self.inner.default.as_ref().and_then(|resolve| resolve(settings))
    }

    #[inline]
    pub(crate) fn id(&self) -> KeyId {
        KeyId(Rc::as_ptr(&self.inner).cast::<()>() as usize)
    }
}

// Manual trait implementations to avoid requiring T: Clone, etc.

impl<T> Clone for SettingKey<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> PartialEq for SettingKey<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for SettingKey<T> {}

impl<T> Hash for SettingKey<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.inner).cast::<()>().hash(state);
    }
}

impl<T> fmt::Debug for SettingKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingKey")
            .field("name", &self.inner.name)
            .field("type", &core::any::type_name::<T>())
            .field("null_replaced_by_default", &self.inner.null_replaced_by_default)
            .finish_non_exhaustive()
    }
}

/// Builder for [`SettingKey`].
///
/// # Example
///
/// ```rust
/// use understory_settings::{SettingKey, Settings};
///
/// let base: SettingKey<u32> = SettingKey::builder("font.size").default_value(12).build();
/// let title = SettingKey::builder("title.font.size")
///     .default_with({
///         let base = base.clone();
///         move |settings: &Settings| settings.get(&base).map(|size| size + 2)
///     })
///     .build();
///
/// let settings = Settings::new();
/// assert_eq!(settings.get(&title), Some(14));
/// ```
pub struct SettingKeyBuilder<T> {
    name: &'static str,
    default: Option<DefaultResolver<T>>,
    null_replaced_by_default: bool,
}

impl<T> fmt::Debug for SettingKeyBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingKeyBuilder")
            .field("name", &self.name)
            .field("has_default", &self.default.is_some())
            .field("null_replaced_by_default", &self.null_replaced_by_default)
            .finish()
    }
}

impl<T: 'static> SettingKeyBuilder<T> {
    /// Creates a builder for a key without a default value.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            default: None,
            null_replaced_by_default: false,
        }
    }

    /// Uses a fixed value as the default.
    #[must_use]
    pub fn default_value(self, value: T) -> Self
    where
        T: Clone,
    {
        self.default_with(move |_| Some(value.clone()))
    }

    /// Uses `resolver` to compute the default.
    ///
    /// The resolver runs lazily, at most once per retained entry, and its
    /// result is memoized until the entry is collected or
    /// [`Settings::refresh_default`] is called.
    #[must_use]
    pub fn default_with<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&Settings) -> Option<T> + 'static,
    {
        self.default = Some(Box::new(resolver));
        self
    }

    /// Sets whether a stored `None` falls back to the default (default: `false`).
    #[must_use]
    pub fn null_replaced_by_default(mut self, replaced: bool) -> Self {
        self.null_replaced_by_default = replaced;
        self
    }

    /// Builds the key.
    #[must_use]
    pub fn build(self) -> SettingKey<T> {
        SettingKey {
            inner: Rc::new(KeyData {
                name: self.name,
                default: self.default,
                null_replaced_by_default: self.null_replaced_by_default,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;

    #[test]
    fn keys_compare_by_identity() {
        let a: SettingKey<u32> = SettingKey::new("width");
        let b: SettingKey<u32> = SettingKey::new("width");

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.id(), a.clone().id());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn builder_defaults() {
        let key: SettingKey<String> = SettingKey::new("theme");
        assert_eq!(key.name(), "theme");
        assert!(!key.has_default());
        assert!(!key.null_replaced_by_default());
    }

    #[test]
    fn builder_options() {
        let key = SettingKey::builder("theme")
            .default_value(String::from("default"))
            .null_replaced_by_default(true)
            .build();

        assert!(key.has_default());
        assert!(key.null_replaced_by_default());
    }

    #[test]
    fn resolve_default_without_resolver() {
        let settings = Settings::new();
        let key: SettingKey<u8> = SettingKey::new("none");
        assert_eq!(key.resolve_default(&settings), None);
    }

    #[test]
    fn key_debug() {
        let key: SettingKey<u32> = SettingKey::new("tab.height");
        let debug = format!("{:?}", key);
        assert!(debug.contains("SettingKey"));
        assert!(debug.contains("tab.height"));
        assert!(debug.contains("u32"));
    }
}
