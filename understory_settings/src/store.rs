// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shared settings store.
//!
//! [`Settings`] maps [`SettingKey`]s to values. Entries are created lazily on
//! first use and dropped again once they hold nothing worth keeping: no
//! listeners, no explicit value, and no memoized default.
//!
//! # Re-entrancy
//!
//! Every operation takes `&self`. The entry map sits behind a `RefCell` whose
//! borrow is released before any user code runs, so default resolvers can read
//! other settings and listeners can freely call back into the store.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use hashbrown::HashMap;

use crate::entry::{self, Entry, ErasedEntry, Resolution};
use crate::key::{KeyId, SettingKey};
use crate::listener::ListenerId;

/// A store of typed settings with lazily resolved defaults and change listeners.
///
/// A `Settings` value is meant to be owned by the application context and
/// handed by reference to every component that reads or observes settings.
/// It is single-threaded (`!Sync`); listeners run synchronously on the
/// caller's stack.
///
/// # Effective values
///
/// [`get`](Self::get) resolves a key as follows:
///
/// 1. an explicitly set value;
/// 2. `None`, if `None` was explicitly set and the key does not
///    [replace `None` by its default](SettingKey::null_replaced_by_default);
/// 3. the key's default, computed on first need and memoized.
///
/// # Example
///
/// ```rust
/// use core::cell::RefCell;
/// use std::rc::Rc;
/// use understory_settings::{SettingKey, Settings};
///
/// let theme: SettingKey<String> = SettingKey::builder("theme")
///     .default_value("default".to_string())
///     .build();
///
/// let settings = Settings::new();
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let log = seen.clone();
/// settings.add_listener(&theme, move |_, _, old: Option<&String>, new: Option<&String>| {
///     log.borrow_mut().push((old.cloned(), new.cloned()));
/// });
///
/// assert_eq!(settings.get(&theme).as_deref(), Some("default"));
/// settings.set(&theme, "dark".to_string());
/// assert_eq!(settings.get(&theme).as_deref(), Some("dark"));
/// assert!(settings.is_set(&theme));
///
/// settings.to_default(&theme);
/// assert!(!settings.is_set(&theme));
/// assert_eq!(seen.borrow().len(), 2);
/// ```
#[derive(Default)]
pub struct Settings {
    entries: RefCell<HashMap<KeyId, Box<dyn ErasedEntry>>>,
    next_listener: Cell<u64>,
}

impl Settings {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Reading
    // =========================================================================

    /// Returns the effective value of `key`.
    ///
    /// Returns `None` only when `None` was deliberately set, or when the key's
    /// default resolves to `None`.
    pub fn get<T: Clone + PartialEq + 'static>(&self, key: &SettingKey<T>) -> Option<T> {
        match self.update(key, Entry::resolve) {
            Resolution::Known(value) => value,
            Resolution::NeedsDefault => {
                let default = key.resolve_default(self);
                self.update(key, |entry| entry.store_default(default.clone()));
                default
            }
            Resolution::Reentrant => {
                log::warn!(
                    "default of setting `{}` depends on itself; resolving to None",
                    key.name()
                );
                None
            }
        }
    }

    /// Returns `true` if a value was explicitly set for `key`.
    ///
    /// An explicitly set `None` counts only when the key does not replace
    /// `None` by its default. This never creates an entry.
    #[must_use]
    pub fn is_set<T: Clone + PartialEq + 'static>(&self, key: &SettingKey<T>) -> bool {
        self.inspect(key, Entry::is_set).unwrap_or(false)
    }

    // =========================================================================
    // Writing
    // =========================================================================

    /// Sets the value of `key`; `None` is a valid value.
    ///
    /// Listeners are notified if the effective value changes.
    pub fn set<T: Clone + PartialEq + 'static>(
        &self,
        key: &SettingKey<T>,
        value: impl Into<Option<T>>,
    ) {
        let value = value.into();
        self.transition(key, move |entry| entry.assign(value));
    }

    /// Sets `value`, or reverts to the default when `value` is `None`.
    pub fn set_or_remove<T: Clone + PartialEq + 'static>(
        &self,
        key: &SettingKey<T>,
        value: Option<T>,
    ) {
        match value {
            Some(value) => self.set(key, value),
            None => self.to_default(key),
        }
    }

    /// Forgets any explicit value so `key` falls back to its default.
    ///
    /// Listeners are notified if the effective value changes.
    pub fn to_default<T: Clone + PartialEq + 'static>(&self, key: &SettingKey<T>) {
        self.transition(key, Entry::clear);
    }

    /// Drops the memoized default of `key` and evaluates the resolver again.
    ///
    /// Defaults are otherwise computed once per entry; use this when a default
    /// depends on state that changed after it was first read. Listeners are
    /// notified if the effective value changes.
    pub fn refresh_default<T: Clone + PartialEq + 'static>(&self, key: &SettingKey<T>) {
        self.transition(key, Entry::invalidate_default);
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Registers `listener` for changes of the effective value of `key`.
    ///
    /// The listener receives the store, the key, and the old and new effective
    /// values. Listeners are called in registration order.
    pub fn add_listener<T, F>(&self, key: &SettingKey<T>, listener: F) -> ListenerId
    where
        T: Clone + PartialEq + 'static,
        F: Fn(&Self, &SettingKey<T>, Option<&T>, Option<&T>) + 'static,
    {
        let id = ListenerId::new(self.next_listener.get());
        self.next_listener.set(id.get() + 1);
        self.update(key, |entry| entry.add_listener(id, Rc::new(listener)));
        log::trace!("listener {:?} added to setting `{}`", id, key.name());
        id
    }

    /// Removes a listener previously added for `key`.
    ///
    /// Returns `true` if the listener was registered.
    pub fn remove_listener<T: Clone + PartialEq + 'static>(
        &self,
        key: &SettingKey<T>,
        id: ListenerId,
    ) -> bool {
        self.modify(key, false, |entry| entry.remove_listener(id))
            .unwrap_or(false)
    }

    /// Returns the number of listeners registered for `key`.
    #[must_use]
    pub fn listener_count<T: 'static>(&self, key: &SettingKey<T>) -> usize {
        self.entries
            .borrow()
            .get(&key.id())
            .map_or(0, |entry| entry.listener_count())
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Returns the number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns `true` if no entries are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Returns `true` if an entry for `key` is currently retained.
    #[must_use]
    pub fn contains<T: 'static>(&self, key: &SettingKey<T>) -> bool {
        self.entries.borrow().contains_key(&key.id())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Applies `mutate` and notifies listeners if the effective value changed.
    fn transition<T, F>(&self, key: &SettingKey<T>, mutate: F)
    where
        T: Clone + PartialEq + 'static,
        F: FnOnce(&mut Entry<T>),
    {
        let old = self.get(key);
        self.update(key, mutate);
        let new = self.get(key);
        if old != new {
            self.notify(key, old.as_ref(), new.as_ref());
        }
    }

    fn notify<T: Clone + 'static>(&self, key: &SettingKey<T>, old: Option<&T>, new: Option<&T>) {
        let Some(listeners) = self.inspect(key, Entry::listener_snapshot) else {
            return;
        };
        if listeners.is_empty() {
            return;
        }
        log::trace!(
            "setting `{}` changed; notifying {} listener(s)",
            key.name(),
            listeners.len()
        );
        for listener in listeners {
            listener(self, key, old, new);
        }
    }

    /// Runs `f` on the entry for `key`, creating it if needed.
    fn update<T, R>(&self, key: &SettingKey<T>, f: impl FnOnce(&mut Entry<T>) -> R) -> R
    where
        T: Clone + 'static,
    {
        match self.modify(key, true, f) {
            Some(result) => result,
            None => unreachable!("entry is created on demand"),
        }
    }

    /// Runs `f` on the entry for `key`, then drops the entry if it became
    /// removable. Returns `None` if there was no entry and `create` is false.
    fn modify<T, R>(
        &self,
        key: &SettingKey<T>,
        create: bool,
        f: impl FnOnce(&mut Entry<T>) -> R,
    ) -> Option<R>
    where
        T: Clone + 'static,
    {
        let id = key.id();
        let mut entries = self.entries.borrow_mut();
        if create && !entries.contains_key(&id) {
            log::trace!("creating entry for setting `{}`", key.name());
            entries.insert(id, entry::erased(key));
        }
        let slot = entries.get_mut(&id)?;
        let entry = slot
            .downcast_mut::<T>()
            .expect("entries are keyed by the identity of their typed key");
        let result = f(entry);
        if slot.is_removable() {
            log::trace!("dropping unused entry for setting `{}`", key.name());
            entries.remove(&id);
        }
        Some(result)
    }

    /// Runs `f` on the entry for `key`, if one exists.
    fn inspect<T, R>(&self, key: &SettingKey<T>, f: impl FnOnce(&Entry<T>) -> R) -> Option<R>
    where
        T: Clone + 'static,
    {
        let entries = self.entries.borrow();
        entries
            .get(&key.id())
            .and_then(|slot| slot.downcast_ref::<T>())
            .map(f)
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.borrow();
        let mut names: Vec<_> = entries.values().map(|entry| entry.name()).collect();
        names.sort_unstable();
        f.debug_struct("Settings")
            .field("count", &entries.len())
            .field("entries", &names)
            .finish_non_exhaustive()
    }
}
