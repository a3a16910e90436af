// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Mirror resolution.
//!
//! Resolving an object yields its namespace record and keeps the record's
//! delegate equal to the record of the object's current delegate:
//!
//! ```text
//! host:     child ──delegate──> base ──delegate──> root
//!             │                   │                  │
//! records:  r(child) ──────────> r(base) ────────> r(root)
//! ```
//!
//! Records are created lazily, ancestors first. A record whose delegate is
//! stale is re-pointed on its next resolution. When the host refuses to
//! re-point it, the record is replaced by a copy with the right delegate;
//! that breaks the record's identity and is logged as a warning.


use veil_host::{HostError, ObjectRef, Realm, Value};

use crate::error::SecretError;
use crate::record::CompanionRecord;
use crate::store::{IdentityStore, expect_object};

/// Resolves records of one namespace.
pub(crate) struct MirrorResolver<'a> {
    realm: &'a Realm,
    store: &'a dyn IdentityStore,
    /// Namespace sequence number, for log fields.
    serial: u64,
}

impl<'a> MirrorResolver<'a> {
    pub(crate) const fn new(realm: &'a Realm, store: &'a dyn IdentityStore, serial: u64) -> Self {
        Self {
            realm,
            store,
            serial,
        }
    }

    /// The record of `target`, created or resynchronized as needed.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `target` is not an object
    /// - `UnsupportedObject` if a record is needed for a non-extensible
    ///   object the store cannot attach one to
    /// - `TamperDetected` if the store's integrity check fails
    pub(crate) fn resolve(&self, target: &Value) -> Result<CompanionRecord, SecretError> {
        let object = expect_object(target)?;
        self.resolve_object(object)
    }

    fn resolve_object(&self, object: &ObjectRef) -> Result<CompanionRecord, SecretError> {
        match self.store.get(&Value::from(object))? {
            Some(record) if !self.resyncs() => Ok(record),
            existing => {
                let parent = self.resolve_ancestors(object)?;
                self.settle(object, existing, parent.as_ref())
            }
        }
    }

    fn resyncs(&self) -> bool {
        self.realm.capabilities().delegate_mutation.is_supported()
    }

    /// Record of the object's current delegate, if it has one.
    ///
    /// Walks the chain upwards first and settles records from the top down,
    /// so the depth of the chain never reaches the call stack. Without
    /// delegate mutation the walk stops at the first ancestor that already
    /// has a record, since everything above it was mirrored when it was made.
    fn resolve_ancestors(&self, object: &ObjectRef) -> Result<Option<CompanionRecord>, SecretError> {
        let resyncs = self.resyncs();
        let mut lineage: Vec<(ObjectRef, Option<CompanionRecord>)> = Vec::new();
        let mut record = None;
        let mut current = object.delegate();
        while let Some(ancestor) = current {
            match self.store.get(&Value::from(&ancestor))? {
                Some(found) if !resyncs => {
                    record = Some(found);
                    break;
                }
                existing => {
                    current = ancestor.delegate();
                    lineage.push((ancestor, existing));
                }
            }
        }
        for (ancestor, existing) in lineage.into_iter().rev() {
            record = Some(self.settle(&ancestor, existing, record.as_ref())?);
        }
        Ok(record)
    }

    /// Create the record of `object`, or bring `existing` in line with `parent`.
    fn settle(
        &self,
        object: &ObjectRef,
        existing: Option<CompanionRecord>,
        parent: Option<&CompanionRecord>,
    ) -> Result<CompanionRecord, SecretError> {
        match existing {
            None => self.create(object, parent),
            Some(record) => self.resync(object, record, parent),
        }
    }

    fn create(
        &self,
        object: &ObjectRef,
        parent: Option<&CompanionRecord>,
    ) -> Result<CompanionRecord, SecretError> {
        let record = self
            .realm
            .create_object(parent.map(CompanionRecord::as_object));
        tracing::trace!(
            namespace = self.serial,
            object = %object.id(),
            record = %record.id(),
            "companion record created"
        );
        self.store.set(&Value::from(object), CompanionRecord::new(record))
    }

    fn resync(
        &self,
        object: &ObjectRef,
        record: CompanionRecord,
        expected: Option<&CompanionRecord>,
    ) -> Result<CompanionRecord, SecretError> {
        if record.delegate().as_ref() == expected {
            return Ok(record);
        }
        match self.realm.set_delegate(
            record.as_object(),
            expected.map(CompanionRecord::as_object),
        ) {
            Ok(()) => {
                tracing::trace!(
                    namespace = self.serial,
                    object = %object.id(),
                    "companion record delegate updated"
                );
                Ok(record)
            }
            Err(HostError::DelegateImmutable | HostError::NotExtensible) => {
                self.rebuild(object, &record, expected)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Replace `record` with a copy delegating to `expected`.
    fn rebuild(
        &self,
        object: &ObjectRef,
        record: &CompanionRecord,
        expected: Option<&CompanionRecord>,
    ) -> Result<CompanionRecord, SecretError> {
        let replacement = self
            .realm
            .create_object(expected.map(CompanionRecord::as_object));
        for (key, descriptor) in self.realm.own_property_descriptors(record.as_object()) {
            replacement.define_property(key, descriptor)?;
        }
        tracing::warn!(
            namespace = self.serial,
            object = %object.id(),
            "host refused delegate change, companion record rebuilt"
        );
        self.store.set(&Value::from(object), CompanionRecord::new(replacement))
    }
}
