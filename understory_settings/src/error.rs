// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by [`KeyRegistry`](crate::KeyRegistry).

use alloc::string::String;

/// Error returned when a setting key cannot be registered or resolved by name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A key with this name is already registered.
    #[error("setting `{name}` is already registered")]
    DuplicateKey {
        /// The conflicting name.
        name: &'static str,
    },
    /// No key with this name is registered.
    #[error("no setting named `{name}` is registered")]
    UnknownKey {
        /// The name that was looked up.
        name: String,
    },
    /// The key is registered with a different value type.
    #[error("setting `{name}` holds `{found}`, not `{expected}`")]
    TypeMismatch {
        /// The name that was looked up.
        name: &'static str,
        /// The value type requested by the caller.
        expected: &'static str,
        /// The value type the key was registered with.
        found: &'static str,
    },
}
