// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_settings --heading-base-level=0

//! Understory Settings: a typed settings store with lazy defaults and change listeners.
//!
//! This crate provides [`Settings`], a store shared by the components of an
//! application (stations, titles, themes, ...) to read configuration slots
//! that none of them owns. Each slot is named by a typed [`SettingKey`].
//!
//! ## Core Concepts
//!
//! - **Keys** carry identity, a default resolver, and a flag telling whether a
//!   stored `None` falls back to the default. Keys built separately are never
//!   equal, even with the same name.
//! - **Effective value**: an explicit value, else a deliberately stored `None`,
//!   else the key's default. Defaults are resolved lazily against the store
//!   (so they may read other settings) and memoized.
//! - **Listeners** observe changes of the effective value of one key. They are
//!   called synchronously, in registration order, over a snapshot of the
//!   listener list.
//! - **Entries** are kept only while needed: a key with no listeners, no
//!   explicit value, and no memoized default has no entry.
//!
//! ## Quick Start
//!
//! ```rust
//! use understory_settings::{SettingKey, Settings};
//!
//! let theme: SettingKey<String> = SettingKey::builder("theme")
//!     .default_value("default".to_string())
//!     .build();
//!
//! let settings = Settings::new();
//! assert_eq!(settings.get(&theme).as_deref(), Some("default"));
//! assert!(!settings.is_set(&theme));
//!
//! settings.set(&theme, "dark".to_string());
//! assert_eq!(settings.get(&theme).as_deref(), Some("dark"));
//!
//! // `None` reverts to the default.
//! settings.set_or_remove(&theme, None);
//! assert_eq!(settings.get(&theme).as_deref(), Some("default"));
//! ```
//!
//! ## Stored `None`
//!
//! By default a stored `None` is a deliberate empty value:
//!
//! ```rust
//! use understory_settings::{SettingKey, Settings};
//!
//! let icon: SettingKey<&'static str> = SettingKey::builder("icon").default_value("dock").build();
//! let settings = Settings::new();
//!
//! settings.set(&icon, None);
//! assert!(settings.is_set(&icon));
//! assert_eq!(settings.get(&icon), None);
//!
//! settings.to_default(&icon);
//! assert_eq!(settings.get(&icon), Some("dock"));
//! ```
//!
//! Keys built with [`null_replaced_by_default(true)`](SettingKeyBuilder::null_replaced_by_default)
//! treat a stored `None` like [`Settings::to_default`] instead.
//!
//! ## Looking Keys Up by Name
//!
//! [`KeyRegistry`] maps names to keys and reports [`SettingsError`] when a name
//! is unknown or registered with another value type.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. Diagnostics go through the `log`
//! facade.

#![no_std]

extern crate alloc;

mod entry;
mod error;
mod key;
mod listener;
mod registry;
mod store;

pub use error::SettingsError;
pub use key::{DefaultResolver, SettingKey, SettingKeyBuilder};
pub use listener::ListenerId;
pub use registry::KeyRegistry;
pub use store::Settings;
