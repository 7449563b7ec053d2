// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-key bookkeeping for [`Settings`](crate::Settings).

use alloc::boxed::Box;
use core::any::Any;
use smallvec::SmallVec;

use crate::key::SettingKey;
use crate::listener::{Listener, ListenerId};

/// Most settings are observed by one or two components.
const INLINE_LISTENERS: usize = 2;

/// Memoization state of a key's default value.
#[derive(Debug)]
pub(crate) enum DefaultSlot<T> {
    /// Never evaluated, or dropped by a refresh.
    Pending,
    /// The resolver is running further up the stack.
    Resolving,
    /// Evaluated; reused until the entry is collected.
    Resolved(Option<T>),
}

/// Outcome of looking up an effective value without running the resolver.
#[derive(Debug)]
pub(crate) enum Resolution<T> {
    /// The effective value is known.
    Known(Option<T>),
    /// The default must be computed; the slot is now [`DefaultSlot::Resolving`].
    NeedsDefault,
    /// The default was requested while its own resolver is running.
    Reentrant,
}

/// The record kept for one key.
pub(crate) struct Entry<T> {
    key: SettingKey<T>,
    value: Option<T>,
    has_been_set: bool,
    default: DefaultSlot<T>,
    listeners: SmallVec<[(ListenerId, Listener<T>); INLINE_LISTENERS]>,
}

impl<T: Clone + 'static> Entry<T> {
    pub(crate) fn new(key: SettingKey<T>) -> Self {
        Self {
            key,
            value: None,
            has_been_set: false,
            default: DefaultSlot::Pending,
            listeners: SmallVec::new(),
        }
    }

    /// Stores an explicit value, `None` included.
    pub(crate) fn assign(&mut self, value: Option<T>) {
        self.value = value;
        self.has_been_set = true;
    }

    /// Forgets the explicit value so reads fall back to the default.
    pub(crate) fn clear(&mut self) {
        self.value = None;
        self.has_been_set = false;
    }

    pub(crate) fn invalidate_default(&mut self) {
        self.default = DefaultSlot::Pending;
    }

    pub(crate) fn store_default(&mut self, value: Option<T>) {
        self.default = DefaultSlot::Resolved(value);
    }

    /// Resolves the effective value: explicit value, then a deliberate `None`,
    /// then the memoized default.
    pub(crate) fn resolve(&mut self) -> Resolution<T> {
        if let Some(value) = &self.value {
            return Resolution::Known(Some(value.clone()));
        }
        if self.has_been_set && !self.key.null_replaced_by_default() {
            return Resolution::Known(None);
        }
        match &self.default {
            DefaultSlot::Resolved(default) => Resolution::Known(default.clone()),
            DefaultSlot::Resolving => Resolution::Reentrant,
            DefaultSlot::Pending => {
                self.default = DefaultSlot::Resolving;
                Resolution::NeedsDefault
            }
        }
    }

    pub(crate) fn is_set(&self) -> bool {
        self.has_been_set && (self.value.is_some() || !self.key.null_replaced_by_default())
    }

    pub(crate) fn add_listener(&mut self, id: ListenerId, listener: Listener<T>) {
        self.listeners.push((id, listener));
    }

    pub(crate) fn remove_listener(&mut self, id: ListenerId) -> bool {
        if let Some(idx) = self.listeners.iter().position(|(lid, _)| *lid == id) {
            self.listeners.remove(idx);
            true
        } else {
            false
        }
    }

    /// Copies the listener list so dispatch is unaffected by re-entrant edits.
    pub(crate) fn listener_snapshot(&self) -> SmallVec<[Listener<T>; INLINE_LISTENERS]> {
        self.listeners.iter().map(|(_, l)| l.clone()).collect()
    }
}

/// Type-erased view of an [`Entry`] for heterogeneous storage.
pub(crate) trait ErasedEntry: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn as_any(&self) -> &dyn Any;
    fn name(&self) -> &'static str;
    fn listener_count(&self) -> usize;
    /// Whether nothing would be lost by dropping this entry.
    fn is_removable(&self) -> bool;
}

impl<T: Clone + 'static> ErasedEntry for Entry<T> {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name(&self) -> &'static str {
        self.key.name()
    }

    fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn is_removable(&self) -> bool {
        self.listeners.is_empty()
            && self.value.is_none()
            && !self.has_been_set
            && matches!(self.default, DefaultSlot::Pending)
    }
}

impl dyn ErasedEntry {
    pub(crate) fn downcast_ref<T: Clone + 'static>(&self) -> Option<&Entry<T>> {
        self.as_any().downcast_ref()
    }

    pub(crate) fn downcast_mut<T: Clone + 'static>(&mut self) -> Option<&mut Entry<T>> {
        self.as_any_mut().downcast_mut()
    }
}

/// Boxes a fresh entry for `key`.
pub(crate) fn erased<T: Clone + 'static>(key: &SettingKey<T>) -> Box<dyn ErasedEntry> {
    Box::new(Entry::new(key.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Settings;
    use alloc::rc::Rc;
    use alloc::string::String;

    fn key(replaced: bool) -> SettingKey<String> {
        SettingKey::builder("theme")
            .default_value(String::from("default"))
            .null_replaced_by_default(replaced)
            .build()
    }

    #[test]
    fn fresh_entry_needs_default_once() {
        let mut entry = Entry::new(key(false));
        assert!(entry.is_removable());

        assert!(matches!(entry.resolve(), Resolution::NeedsDefault));
        assert!(matches!(entry.resolve(), Resolution::Reentrant));
        assert!(!entry.is_removable());

        entry.store_default(Some(String::from("default")));
        assert!(matches!(
            entry.resolve(),
            Resolution::Known(Some(ref v)) if v == "default"
        ));
    }

    #[test]
    fn explicit_none_hides_default_unless_replaced() {
        let mut kept = Entry::new(key(false));
        kept.assign(None);
        assert!(matches!(kept.resolve(), Resolution::Known(None)));
        assert!(kept.is_set());

        let mut replaced = Entry::new(key(true));
        replaced.assign(None);
        assert!(matches!(replaced.resolve(), Resolution::NeedsDefault));
        assert!(!replaced.is_set());
    }

    #[test]
    fn clear_resets_set_flag() {
        let mut entry = Entry::new(key(false));
        entry.assign(Some(String::from("dark")));
        assert!(entry.is_set());
        assert!(!entry.is_removable());

        entry.clear();
        assert!(!entry.is_set());
        assert!(entry.is_removable());
    }

    #[test]
    fn listeners_keep_entry_alive() {
        let mut entry = Entry::new(key(false));
        let id = ListenerId::new(1);
        entry.add_listener(
            id,
            Rc::new(
                |_: &Settings, _: &SettingKey<String>, _: Option<&String>, _: Option<&String>| {},
            ),
        );

        assert!(!entry.is_removable());
        assert_eq!(entry.listener_snapshot().len(), 1);

        assert!(entry.remove_listener(id));
        assert!(!entry.remove_listener(id));
        assert!(entry.is_removable());
    }

    #[test]
    fn erased_downcast() {
        let k = key(false);
        let mut boxed = erased(&k);
        assert_eq!(boxed.name(), "theme");
        assert!(boxed.downcast_ref::<String>().is_some());
        assert!(boxed.downcast_mut::<u32>().is_none());
    }
}
