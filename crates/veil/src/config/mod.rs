// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Storage configuration.
//!
//! A [`Secrets`](crate::Secrets) factory always has exactly one configured
//! backend. The backend is selected by [`StorageKind`], which can be parsed
//! from its name so embedders can take it from their own configuration.


use core::fmt;
use core::str::FromStr;

use crate::error::SecretError;

/// Identity store backend used for new namespaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum StorageKind {
    /// Concealed, capability-gated field on each object.
    #[default]
    HiddenSlot,
    /// The host's weak map.
    NativeWeak,
}

impl StorageKind {
    /// Every backend, in registration order.
    pub const ALL: [Self; 2] = [Self::HiddenSlot, Self::NativeWeak];

    /// Canonical name of the backend.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::HiddenSlot => "HiddenSlot",
            Self::NativeWeak => "NativeWeak",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StorageKind {
    type Err = SecretError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HiddenSlot" | "WeakKeyedStore" => Ok(Self::HiddenSlot),
            "NativeWeak" | "WeakMap" => Ok(Self::NativeWeak),
            _ => Err(SecretError::ConfigurationError {
                requested: s.to_owned(),
            }),
        }
    }
}

/// Configuration of a [`Secrets`](crate::Secrets) factory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SecretsConfig {
    /// Backend for namespaces created by the factory.
    pub storage: StorageKind,
}

impl SecretsConfig {
    /// Return a copy of this config with a different backend.
    #[must_use]
    pub const fn with_storage(mut self, storage: StorageKind) -> Self {
        self.storage = storage;
        self
    }
}
