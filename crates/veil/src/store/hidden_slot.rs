// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Hidden slot backend.
//!
//! Each object gets one concealed, read-only, non-enumerable property named
//! by the backend's marker key. The property holds a capability function
//! closed over a private per-object map; the map holds one record per
//! namespace of this backend.
//!
//! The capability only yields the map while the backend is unlocked, and
//! the backend unlocks only for the duration of its own call:
//!
//! ```text
//! open:   locked? ──no──> tamper
//!           │yes
//!         unlock ─> call capability ─> relock ─> valid? ──no──> tamper
//!                                                  │yes
//!                                                 map
//! ```
//!
//! A call from anywhere else finds the backend locked, which poisons the
//! backend for good: every later access fails with `TamperDetected`.

use core::cell::Cell;
use std::rc::Rc;

use veil_host::{
    HostError, HostFunction, ObjectRef, PropertyDescriptor, PropertyKey, Realm, ReflectionGuard,
    Value,
};
use veil_ident::IdentifierGenerator;

use super::{IdentityStore, NamespaceId, StoreFactory, expect_object};
use crate::config::StorageKind;
use crate::error::SecretError;
use crate::record::CompanionRecord;

/// Prefix of every marker key.
const MARKER_PREFIX: &str = "||:";

/// Marker key and lock state shared by the backend, its stores, its guard
/// and every capability it installed.
struct SlotCore {
    marker: PropertyKey,
    locked: Cell<bool>,
    valid: Cell<bool>,
    tampered: Cell<bool>,
}

impl SlotCore {
    fn new(marker: PropertyKey) -> Self {
        Self {
            marker,
            locked: Cell::new(true),
            valid: Cell::new(false),
            tampered: Cell::new(false),
        }
    }

    /// Record a protocol violation.
    fn trip(&self) -> SecretError {
        self.tampered.set(true);
        tracing::error!("hidden slot protocol violated");
        SecretError::TamperDetected
    }

    /// Attach a fresh slot to `object` and return its private map.
    fn install(self: &Rc<Self>, realm: &Realm, object: &ObjectRef) -> Result<ObjectRef, HostError> {
        let map = realm.create_object(None);
        let core = Rc::clone(self);
        // Bound, so cycle collection sees the map
        let capability = HostFunction::bound("parallel", map.clone(), move |private, _args| {
            if core.locked.get() {
                core.valid.set(false);
                core.tampered.set(true);
                tracing::error!("hidden slot capability invoked while locked");
                return Err(HostError::Thrown("parallel object locked".into()));
            }
            core.locked.set(true);
            core.valid.set(true);
            Ok(Value::Object(private.clone()))
        });
        object.define_property(
            &self.marker,
            PropertyDescriptor::locked(Value::Function(capability)),
        )?;
        tracing::trace!(object = %object.id(), "hidden slot installed");
        Ok(map)
    }

    /// Run the capability protocol on `capability`.
    fn open(&self, capability: &HostFunction) -> Result<ObjectRef, SecretError> {
        if !self.locked.get() {
            return Err(self.trip());
        }
        self.locked.set(false);
        let outcome = capability.call(&[]);
        self.locked.set(true);
        let valid = self.valid.replace(false);
        match outcome {
            Ok(Value::Object(map)) if valid => Ok(map),
            _ => Err(self.trip()),
        }
    }

    /// The private map of `object`, installing a slot on first use.
    fn parallels(self: &Rc<Self>, realm: &Realm, object: &ObjectRef) -> Result<ObjectRef, SecretError> {
        if self.tampered.get() {
            return Err(SecretError::TamperDetected);
        }
        match object.get_own(self.marker.as_str()) {
            None => self.install(realm, object).map_err(|err| match err {
                HostError::NotExtensible => SecretError::UnsupportedObject,
                other => SecretError::Host(other),
            }),
            Some(descriptor) => match descriptor.value {
                Value::Function(capability) => self.open(&capability),
                _ => Err(self.trip()),
            },
        }
    }
}

/// Keeps the marker out of listings and installs the slot before an object
/// stops accepting properties.
struct SlotGuard {
    core: Rc<SlotCore>,
}

impl ReflectionGuard for SlotGuard {
    fn conceals(&self, key: &PropertyKey) -> bool {
        *key == self.core.marker
    }

    fn before_seal(&self, realm: &Realm, object: &ObjectRef) -> Result<(), HostError> {
        // Sealing an already non-extensible object changes nothing to retrofit
        if !object.is_extensible() || object.has_own(self.core.marker.as_str()) {
            return Ok(());
        }
        self.core.install(realm, object).map(|_| ())
    }
}

/// Backend storing records in a concealed slot on each object.
pub struct HiddenSlotBackend {
    realm: Rc<Realm>,
    core: Rc<SlotCore>,
}

impl HiddenSlotBackend {
    /// Mint a marker key and register the backend's reflection guard.
    ///
    /// # Errors
    ///
    /// Returns `EnvironmentUnsupported` if the realm has no reflection hooks.
    pub fn new(realm: Rc<Realm>, generator: &mut IdentifierGenerator) -> Result<Self, SecretError> {
        let marker = PropertyKey::from(format!("{MARKER_PREFIX}{}", generator.identifier()));
        let core = Rc::new(SlotCore::new(marker));
        realm
            .install_guard(Rc::new(SlotGuard {
                core: Rc::clone(&core),
            }))
            .map_err(|err| match err {
                HostError::Unsupported(capability) => {
                    SecretError::EnvironmentUnsupported { capability }
                }
                other => SecretError::Host(other),
            })?;
        Ok(Self { realm, core })
    }

    /// Returns true once a protocol violation has been observed.
    #[must_use]
    pub fn is_tampered(&self) -> bool {
        self.core.tampered.get()
    }

    #[cfg(test)]
    pub(crate) fn marker(&self) -> &PropertyKey {
        &self.core.marker
    }
}

impl StoreFactory for HiddenSlotBackend {
    fn kind(&self) -> StorageKind {
        StorageKind::HiddenSlot
    }

    fn create_store(&self, namespace: NamespaceId) -> Result<Box<dyn IdentityStore>, SecretError> {
        Ok(Box::new(HiddenSlotStore {
            realm: Rc::clone(&self.realm),
            core: Rc::clone(&self.core),
            namespace,
        }))
    }
}

/// One namespace's view of a [`HiddenSlotBackend`].
struct HiddenSlotStore {
    realm: Rc<Realm>,
    core: Rc<SlotCore>,
    namespace: NamespaceId,
}

impl IdentityStore for HiddenSlotStore {
    fn get(&self, target: &Value) -> Result<Option<CompanionRecord>, SecretError> {
        let object = expect_object(target)?;
        let map = self.core.parallels(&self.realm, object)?;
        match map.get_own(self.namespace.key().as_str()) {
            None => Ok(None),
            Some(descriptor) => match descriptor.value {
                Value::Object(record) => Ok(Some(CompanionRecord::new(record))),
                _ => Err(self.core.trip()),
            },
        }
    }

    fn set(&self, target: &Value, record: CompanionRecord) -> Result<CompanionRecord, SecretError> {
        let object = expect_object(target)?;
        let map = self.core.parallels(&self.realm, object)?;
        map.set(self.namespace.key(), record.as_object())?;
        Ok(record)
    }
}
