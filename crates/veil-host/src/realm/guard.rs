// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Reflection guard hook.

use super::Realm;
use crate::error::HostError;
use crate::object::ObjectRef;
use crate::value::PropertyKey;

/// Hook consulted by a [`Realm`]'s reflection and extensibility operations.
///
/// A guard owns some property keys that must never surface through generic
/// enumeration, and may need to touch an object before it stops accepting
/// new properties.
pub trait ReflectionGuard {
    /// Returns true if `key` must be left out of key and descriptor listings.
    fn conceals(&self, key: &PropertyKey) -> bool;

    /// Runs before `object` becomes non-extensible.
    ///
    /// # Errors
    ///
    /// An error aborts the extensibility change and is returned to its caller.
    fn before_seal(&self, realm: &Realm, object: &ObjectRef) -> Result<(), HostError>;
}
