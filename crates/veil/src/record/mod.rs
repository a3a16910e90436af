// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Companion records.
//!
//! A companion record is an ordinary host object owned by one namespace.
//! Its delegate is the same namespace's record of the host object's
//! delegate, so reads fall through to the ancestors' private state exactly
//! like they do on the host objects themselves.


use core::fmt;

use veil_host::{ObjectRef, PropertyKey, Value};

use crate::error::SecretError;

/// Private state of one namespace for one host object.
///
/// Clones refer to the same record; equality is identity.
#[derive(Clone, PartialEq, Eq)]
pub struct CompanionRecord(ObjectRef);

impl CompanionRecord {
    pub(crate) const fn new(object: ObjectRef) -> Self {
        Self(object)
    }

    /// Property value, searching the record's delegate chain.
    #[must_use]
    pub fn get(&self, key: &str) -> Value {
        self.0.get(key)
    }

    /// Own property value, without falling through to ancestors.
    #[must_use]
    pub fn get_own(&self, key: &str) -> Option<Value> {
        self.0.get_own(key).map(|descriptor| descriptor.value)
    }

    /// Assign an own property.
    ///
    /// # Errors
    ///
    /// Fails only if the property was made read-only or the record was made
    /// non-extensible through [`as_object`](Self::as_object).
    pub fn set(&self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> Result<(), SecretError> {
        Ok(self.0.set(key, value)?)
    }

    /// Remove an own property. Returns `false` if there was none.
    ///
    /// # Errors
    ///
    /// Fails if the property is non-configurable.
    pub fn delete(&self, key: &str) -> Result<bool, SecretError> {
        Ok(self.0.delete(key)?)
    }

    /// Returns true if the record or one of its ancestors has the property.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.0.has(key)
    }

    /// Returns true if the record itself has the property.
    #[must_use]
    pub fn has_own(&self, key: &str) -> bool {
        self.0.has_own(key)
    }

    /// The record this one inherits from.
    #[must_use]
    pub fn delegate(&self) -> Option<Self> {
        self.0.delegate().map(Self)
    }

    /// The underlying host object.
    #[must_use]
    pub const fn as_object(&self) -> &ObjectRef {
        &self.0
    }
}

impl fmt::Debug for CompanionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompanionRecord({})", self.0.id())
    }
}
