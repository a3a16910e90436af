// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Realm: the host environment objects live in.
//!
//! A realm owns:
//!
//! - The capability set of the host (reflection hooks, weak maps, delegate
//!   mutation)
//! - The registry of [`ReflectionGuard`]s
//! - The object ID sequence
//! - The heap of every object it created, for cycle collection
//!
//! Every operation that can reveal property names (key listings, descriptor
//! listings) and every operation that revokes extensibility goes through the
//! realm, which consults the registered guards first. Guards are registered
//! once and never removed.

mod guard;


pub use guard::ReflectionGuard;

use core::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::HostError;
use crate::heap::Heap;
use crate::object::{ObjectId, ObjectRef, PropertyDescriptor};
use crate::value::PropertyKey;
use crate::weak::WeakMap;

/// How a host treats requests to replace an object's delegate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DelegateMutation {
    /// Any extensible object may get a new delegate.
    #[default]
    Always,
    /// Objects created without a delegate refuse a new one.
    ExceptOrphans,
    /// Delegates are fixed at creation.
    Never,
}

impl DelegateMutation {
    /// Returns true if delegates can change at all.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        !matches!(self, Self::Never)
    }
}

/// What the host environment offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Reflection guards can be registered.
    pub reflection_hooks: bool,
    /// Weak maps can be created.
    pub weak_maps: bool,
    /// Delegate replacement policy.
    pub delegate_mutation: DelegateMutation,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            reflection_hooks: true,
            weak_maps: true,
            delegate_mutation: DelegateMutation::Always,
        }
    }
}

/// The host environment.
pub struct Realm {
    capabilities: Capabilities,
    guards: RefCell<Vec<Rc<dyn ReflectionGuard>>>,
    next_object: Cell<u64>,
    heap: Heap,
}

impl Realm {
    /// Create a realm with the given capabilities.
    #[must_use]
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            guards: RefCell::new(Vec::new()),
            next_object: Cell::new(1),
            heap: Heap::new(),
        }
    }

    /// The realm's capabilities.
    #[must_use]
    pub const fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Create an extensible object with no properties.
    ///
    /// May run a cycle collection first when enough objects accumulated
    /// since the last one.
    #[must_use]
    pub fn create_object(&self, delegate: Option<&ObjectRef>) -> ObjectRef {
        let id = self.next_object.get();
        self.next_object.set(id.wrapping_add(1));
        let object = ObjectRef::new(ObjectId::new(id), delegate.cloned());
        if self.heap.track(&object) {
            self.collect_cycles();
        }
        object
    }

    // --- Collection ---

    /// Reclaim objects that are only reachable from each other.
    ///
    /// An object survives while a handle outside the realm's objects reaches
    /// it, directly or through properties, delegates, bound functions and
    /// entries of live weak maps. Everything else has its properties,
    /// delegate and weak entries cleared, which frees it.
    ///
    /// Returns the number of objects cleared. Nothing is cleared while one
    /// of the objects is being modified.
    pub fn collect_cycles(&self) -> usize {
        self.heap.collect()
    }

    /// Number of objects created by this realm that are still alive.
    #[must_use]
    pub fn live_objects(&self) -> usize {
        self.heap.live_count()
    }

    // --- Delegates ---

    /// Replace an object's delegate.
    ///
    /// Setting the current delegate again always succeeds.
    ///
    /// # Errors
    ///
    /// - `DelegateImmutable` if the host forbids the change for this object
    /// - `NotExtensible` if the object is not extensible
    /// - `DelegateCycle` if the new chain would loop back to `object`
    pub fn set_delegate(
        &self,
        object: &ObjectRef,
        delegate: Option<&ObjectRef>,
    ) -> Result<(), HostError> {
        if object.delegate().as_ref() == delegate {
            return Ok(());
        }
        match self.capabilities.delegate_mutation {
            DelegateMutation::Never => return Err(HostError::DelegateImmutable),
            DelegateMutation::ExceptOrphans if object.is_orphan() => {
                return Err(HostError::DelegateImmutable);
            }
            DelegateMutation::Always | DelegateMutation::ExceptOrphans => {}
        }
        if !object.is_extensible() {
            return Err(HostError::NotExtensible);
        }

        let mut current = delegate.cloned();
        while let Some(ancestor) = current {
            if ancestor.ptr_eq(object) {
                return Err(HostError::DelegateCycle);
            }
            current = ancestor.delegate();
        }

        object.replace_delegate(delegate.cloned());
        Ok(())
    }

    // --- Guards ---

    /// Register a reflection guard.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` if the realm has no reflection hooks.
    pub fn install_guard(&self, guard: Rc<dyn ReflectionGuard>) -> Result<(), HostError> {
        if !self.capabilities.reflection_hooks {
            return Err(HostError::Unsupported("reflection hooks"));
        }
        self.guards.borrow_mut().push(guard);
        tracing::debug!(guards = self.guards.borrow().len(), "reflection guard installed");
        Ok(())
    }

    /// Number of registered guards.
    #[must_use]
    pub fn guard_count(&self) -> usize {
        self.guards.borrow().len()
    }

    fn conceals(&self, key: &PropertyKey) -> bool {
        self.guards.borrow().iter().any(|g| g.conceals(key))
    }

    /// Let every guard prepare `object` for losing extensibility.
    ///
    /// Guards run in registration order; the first error stops the rest.
    fn prepare_seal(&self, object: &ObjectRef) -> Result<(), HostError> {
        // Guards may create objects, so don't hold the registry borrow while calling them
        let guards: Vec<Rc<dyn ReflectionGuard>> = self.guards.borrow().clone();
        for guard in &guards {
            guard.before_seal(self, object)?;
        }
        Ok(())
    }

    // --- Reflection ---

    /// Names of all own properties, in insertion order.
    #[must_use]
    pub fn own_keys(&self, object: &ObjectRef) -> Vec<PropertyKey> {
        self.own_property_descriptors(object)
            .into_iter()
            .map(|(key, _)| key)
            .collect()
    }

    /// Names of own enumerable properties.
    #[must_use]
    pub fn enumerable_keys(&self, object: &ObjectRef) -> Vec<PropertyKey> {
        self.own_property_descriptors(object)
            .into_iter()
            .filter(|(_, descriptor)| descriptor.attributes.enumerable)
            .map(|(key, _)| key)
            .collect()
    }

    /// Names of own and inherited properties, nearest first, without duplicates.
    #[must_use]
    pub fn all_keys(&self, object: &ObjectRef) -> Vec<PropertyKey> {
        self.all_property_descriptors(object)
            .into_iter()
            .map(|(key, _)| key)
            .collect()
    }

    /// Own properties with their descriptors, in insertion order.
    #[must_use]
    pub fn own_property_descriptors(
        &self,
        object: &ObjectRef,
    ) -> Vec<(PropertyKey, PropertyDescriptor)> {
        object
            .own_entries()
            .into_iter()
            .filter(|(key, _)| !self.conceals(key))
            .collect()
    }

    /// Own and inherited properties; an own property shadows inherited ones.
    #[must_use]
    pub fn all_property_descriptors(
        &self,
        object: &ObjectRef,
    ) -> Vec<(PropertyKey, PropertyDescriptor)> {
        let mut result: Vec<(PropertyKey, PropertyDescriptor)> = Vec::new();
        let mut current = Some(object.clone());
        while let Some(holder) = current {
            for (key, descriptor) in self.own_property_descriptors(&holder) {
                if !result.iter().any(|(seen, _)| *seen == key) {
                    result.push((key, descriptor));
                }
            }
            current = holder.delegate();
        }
        result
    }

    // --- Extensibility ---

    /// Stop new properties from being added.
    ///
    /// # Errors
    ///
    /// Propagates the first guard failure. The object keeps its
    /// extensibility and attributes, but guards that ran before the failing
    /// one may already have added their properties.
    pub fn prevent_extensions(&self, object: &ObjectRef) -> Result<(), HostError> {
        self.prepare_seal(object)?;
        object.revoke_extensibility();
        Ok(())
    }

    /// Prevent extensions and make every own property non-configurable.
    ///
    /// # Errors
    ///
    /// Propagates the first guard failure. The object keeps its
    /// extensibility and attributes, but guards that ran before the failing
    /// one may already have added their properties.
    pub fn seal(&self, object: &ObjectRef) -> Result<(), HostError> {
        self.prepare_seal(object)?;
        object.revoke_extensibility();
        object.restrict_attributes(|attributes| attributes.configurable = false);
        Ok(())
    }

    /// Seal and make every own property read-only.
    ///
    /// # Errors
    ///
    /// Propagates the first guard failure. The object keeps its
    /// extensibility and attributes, but guards that ran before the failing
    /// one may already have added their properties.
    pub fn freeze(&self, object: &ObjectRef) -> Result<(), HostError> {
        self.prepare_seal(object)?;
        object.revoke_extensibility();
        object.restrict_attributes(|attributes| {
            attributes.configurable = false;
            attributes.writable = false;
        });
        Ok(())
    }

    /// Returns true if the object is non-extensible and all its own
    /// properties are non-configurable.
    #[must_use]
    pub fn is_sealed(&self, object: &ObjectRef) -> bool {
        !object.is_extensible()
            && object
                .own_entries()
                .iter()
                .all(|(_, descriptor)| !descriptor.attributes.configurable)
    }

    /// Returns true if the object is sealed and all its own properties are
    /// read-only.
    #[must_use]
    pub fn is_frozen(&self, object: &ObjectRef) -> bool {
        self.is_sealed(object)
            && object
                .own_entries()
                .iter()
                .all(|(_, descriptor)| !descriptor.attributes.writable)
    }

    // --- Weak maps ---

    /// Create an empty weak map.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` if the realm has no weak maps.
    pub fn weak_map(&self) -> Result<WeakMap, HostError> {
        if !self.capabilities.weak_maps {
            return Err(HostError::Unsupported("weak maps"));
        }
        Ok(WeakMap::new())
    }
}

impl Default for Realm {
    fn default() -> Self {
        Self::new(Capabilities::default())
    }
}
