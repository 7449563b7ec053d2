// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change listener types.

use alloc::rc::Rc;
use core::fmt;

use crate::key::SettingKey;
use crate::store::Settings;

/// Callback invoked when the effective value of a setting changes.
///
/// Arguments are the store, the key, the old effective value and the new
/// effective value. Listeners run on the caller's stack right after the
/// mutation and may call back into the store.
pub(crate) type Listener<T> = Rc<dyn Fn(&Settings, &SettingKey<T>, Option<&T>, Option<&T>)>;

/// Handle returned by [`Settings::add_listener`], used to remove the listener again.
///
/// Ids are unique within the store that issued them.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    #[inline]
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value of this id.
    #[must_use]
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ListenerId").field(&self.0).finish()
    }
}
