// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Identity stores.
//!
//! An identity store maps an object to the companion record of one
//! namespace. Stores are keyed by object identity and never keep a record
//! alive longer than its object: the record is always held by the object
//! itself, either inside a hidden slot or inside the host's weak map table.
//!
//! Two backends exist:
//!
//! | Backend | Storage | Non-extensible objects |
//! |---------|---------|------------------------|
//! | [`HiddenSlotBackend`] | concealed, capability-gated property | only if the slot already exists |
//! | [`NativeWeakBackend`] | host [`WeakMap`](veil_host::WeakMap) | always |

mod hidden_slot;
mod native_weak;


pub use hidden_slot::HiddenSlotBackend;
pub use native_weak::NativeWeakBackend;

use core::fmt;

use veil_host::{ObjectRef, PropertyKey, Value};

use crate::config::StorageKind;
use crate::error::SecretError;
use crate::record::CompanionRecord;

/// Unguessable identifier of one namespace.
///
/// Its value never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct NamespaceId(PropertyKey);

impl NamespaceId {
    pub(crate) fn new(id: String) -> Self {
        Self(PropertyKey::from(id))
    }

    /// The id as a property key of a per-object map.
    pub(crate) const fn key(&self) -> &PropertyKey {
        &self.0
    }
}

impl fmt::Debug for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NamespaceId(..)")
    }
}

/// Map from object identity to one namespace's companion records.
pub trait IdentityStore {
    /// The record stored for `target`, if any.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `target` is not an object
    /// - `TamperDetected` if the backend's integrity check fails
    fn get(&self, target: &Value) -> Result<Option<CompanionRecord>, SecretError>;

    /// Store `record` for `target` and return it.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `target` is not an object
    /// - `UnsupportedObject` if the backend cannot attach anything to `target`
    /// - `TamperDetected` if the backend's integrity check fails
    fn set(&self, target: &Value, record: CompanionRecord) -> Result<CompanionRecord, SecretError>;
}

/// Creates one [`IdentityStore`] per namespace.
pub trait StoreFactory {
    /// The backend this factory implements.
    fn kind(&self) -> StorageKind;

    /// Create the store for a freshly minted namespace.
    fn create_store(&self, namespace: NamespaceId) -> Result<Box<dyn IdentityStore>, SecretError>;
}

/// Extract the object from `target`, rejecting every other value.
pub(crate) fn expect_object(target: &Value) -> Result<&ObjectRef, SecretError> {
    target.as_object().ok_or_else(|| SecretError::InvalidArgument {
        received: target.type_name().to_owned(),
    })
}
