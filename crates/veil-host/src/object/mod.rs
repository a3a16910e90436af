// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Host objects.
//!
//! An object owns an ordered list of data properties, an optional delegate it
//! inherits missing properties from, and an extensible flag. Objects are
//! created by a [`Realm`](crate::Realm); the operations here are the ones
//! that only touch a single named property. Listing property names is only
//! possible through the realm.
//!
//! Each object also carries an internal table of weak map entries. The table
//! is never visible through reflection and is dropped with the object, or
//! cleared by the realm's cycle collection once the object is unreachable.


use core::cell::{Cell, RefCell};
use core::fmt;
use std::rc::{Rc, Weak};

use crate::error::HostError;
use crate::heap::Edge;
use crate::value::{PropertyKey, Value};

/// Identity of an object within its realm, for diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Creates a new object ID.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Property attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attributes {
    /// The value can be changed by assignment.
    pub writable: bool,
    /// The property shows up in enumerable key listings.
    pub enumerable: bool,
    /// The property can be deleted or redefined.
    pub configurable: bool,
}

impl Attributes {
    /// Attributes of a property created by plain assignment.
    pub const DEFAULT: Self = Self {
        writable: true,
        enumerable: true,
        configurable: true,
    };

    /// Read-only, non-enumerable, non-configurable.
    pub const LOCKED: Self = Self {
        writable: false,
        enumerable: false,
        configurable: false,
    };
}

impl Default for Attributes {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A property's value together with its attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// The stored value.
    pub value: Value,
    /// The property's attributes.
    pub attributes: Attributes,
}

impl PropertyDescriptor {
    /// Descriptor with default attributes.
    #[must_use]
    pub fn data(value: Value) -> Self {
        Self {
            value,
            attributes: Attributes::DEFAULT,
        }
    }

    /// Descriptor for a read-only, non-enumerable, non-configurable property.
    #[must_use]
    pub fn locked(value: Value) -> Self {
        Self {
            value,
            attributes: Attributes::LOCKED,
        }
    }
}

struct Property {
    key: PropertyKey,
    descriptor: PropertyDescriptor,
}

/// Entry of some weak map whose key is the owning object.
struct WeakEntry {
    map: Weak<()>,
    value: Value,
}

pub(crate) struct ObjectCell {
    id: ObjectId,
    properties: RefCell<Vec<Property>>,
    delegate: RefCell<Option<ObjectRef>>,
    extensible: Cell<bool>,
    /// Created without a delegate.
    orphan: bool,
    weak_entries: RefCell<Vec<WeakEntry>>,
}

impl Drop for ObjectCell {
    fn drop(&mut self) {
        // Unlink delegate chains in a loop instead of one nested drop per link
        let mut next = self.delegate.get_mut().take();
        while let Some(ObjectRef(cell)) = next {
            next = match Rc::try_unwrap(cell) {
                Ok(mut owned) => owned.delegate.get_mut().take(),
                Err(_) => None,
            };
        }
    }
}

/// Reference to a host object.
///
/// Clones refer to the same object. Equality is identity.
#[derive(Clone)]
pub struct ObjectRef(Rc<ObjectCell>);

impl ObjectRef {
    pub(crate) fn new(id: ObjectId, delegate: Option<Self>) -> Self {
        let orphan = delegate.is_none();
        Self(Rc::new(ObjectCell {
            id,
            properties: RefCell::new(Vec::new()),
            delegate: RefCell::new(delegate),
            extensible: Cell::new(true),
            orphan,
            weak_entries: RefCell::new(Vec::new()),
        }))
    }

    /// The object's diagnostic ID.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.0.id
    }

    /// Returns true if both handles refer to the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// The object this one inherits missing properties from.
    #[must_use]
    pub fn delegate(&self) -> Option<Self> {
        self.0.delegate.borrow().clone()
    }

    /// Returns true if new properties can be added.
    #[must_use]
    pub fn is_extensible(&self) -> bool {
        self.0.extensible.get()
    }

    /// Returns true if the object was created without a delegate.
    #[must_use]
    pub fn is_orphan(&self) -> bool {
        self.0.orphan
    }

    /// Own property by name.
    ///
    /// Lookup by name is not filtered by reflection guards: knowing the name
    /// is the capability.
    #[must_use]
    pub fn get_own(&self, key: &str) -> Option<PropertyDescriptor> {
        self.0
            .properties
            .borrow()
            .iter()
            .find(|p| p.key == *key)
            .map(|p| p.descriptor.clone())
    }

    /// Returns true if the object has an own property named `key`.
    #[must_use]
    pub fn has_own(&self, key: &str) -> bool {
        self.0.properties.borrow().iter().any(|p| p.key == *key)
    }

    /// Property value, searching the delegate chain.
    ///
    /// Returns `Value::Undefined` if no object in the chain has the property.
    #[must_use]
    pub fn get(&self, key: &str) -> Value {
        let mut current = Some(self.clone());
        while let Some(object) = current {
            if let Some(descriptor) = object.get_own(key) {
                return descriptor.value;
            }
            current = object.delegate();
        }
        Value::Undefined
    }

    /// Returns true if any object in the delegate chain has the property.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        let mut current = Some(self.clone());
        while let Some(object) = current {
            if object.has_own(key) {
                return true;
            }
            current = object.delegate();
        }
        false
    }

    /// Assign an own property.
    ///
    /// Creates a property with default attributes if none exists.
    ///
    /// # Errors
    ///
    /// Returns `NotWritable` for a read-only own property and
    /// `NotExtensible` when a new property would have to be added to a
    /// non-extensible object.
    pub fn set(&self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> Result<(), HostError> {
        let key = key.into();
        let value = value.into();
        let mut properties = self.0.properties.borrow_mut();
        if let Some(property) = properties.iter_mut().find(|p| p.key == key) {
            if !property.descriptor.attributes.writable {
                return Err(HostError::NotWritable(key));
            }
            property.descriptor.value = value;
            return Ok(());
        }
        if !self.is_extensible() {
            return Err(HostError::NotExtensible);
        }
        properties.push(Property {
            key,
            descriptor: PropertyDescriptor::data(value),
        });
        Ok(())
    }

    /// Define an own property with explicit attributes.
    ///
    /// # Errors
    ///
    /// Returns `NonConfigurable` when redefining a non-configurable property
    /// and `NotExtensible` when adding to a non-extensible object.
    pub fn define_property(
        &self,
        key: impl Into<PropertyKey>,
        descriptor: PropertyDescriptor,
    ) -> Result<(), HostError> {
        let key = key.into();
        let mut properties = self.0.properties.borrow_mut();
        if let Some(property) = properties.iter_mut().find(|p| p.key == key) {
            if !property.descriptor.attributes.configurable {
                return Err(HostError::NonConfigurable(key));
            }
            property.descriptor = descriptor;
            return Ok(());
        }
        if !self.is_extensible() {
            return Err(HostError::NotExtensible);
        }
        properties.push(Property { key, descriptor });
        Ok(())
    }

    /// Remove an own property.
    ///
    /// Returns `false` if there was no such property.
    ///
    /// # Errors
    ///
    /// Returns `NonConfigurable` if the property cannot be deleted.
    pub fn delete(&self, key: &str) -> Result<bool, HostError> {
        let mut properties = self.0.properties.borrow_mut();
        let Some(index) = properties.iter().position(|p| p.key == *key) else {
            return Ok(false);
        };
        if !properties[index].descriptor.attributes.configurable {
            return Err(HostError::NonConfigurable(PropertyKey::new(key)));
        }
        properties.remove(index);
        Ok(true)
    }

    /// All own properties in insertion order, unfiltered.
    pub(crate) fn own_entries(&self) -> Vec<(PropertyKey, PropertyDescriptor)> {
        self.0
            .properties
            .borrow()
            .iter()
            .map(|p| (p.key.clone(), p.descriptor.clone()))
            .collect()
    }

    pub(crate) fn replace_delegate(&self, delegate: Option<Self>) {
        *self.0.delegate.borrow_mut() = delegate;
    }

    pub(crate) fn revoke_extensibility(&self) {
        self.0.extensible.set(false);
    }

    /// Apply `f` to the attributes of every own property.
    pub(crate) fn restrict_attributes(&self, f: impl Fn(&mut Attributes)) {
        for property in self.0.properties.borrow_mut().iter_mut() {
            f(&mut property.descriptor.attributes);
        }
    }

    pub(crate) fn weak_get(&self, map: &Rc<()>) -> Option<Value> {
        self.0
            .weak_entries
            .borrow()
            .iter()
            .find(|e| core::ptr::eq(e.map.as_ptr(), Rc::as_ptr(map)))
            .map(|e| e.value.clone())
    }

    /// Insert or replace the entry for `map`, dropping entries of dead maps.
    pub(crate) fn weak_set(&self, map: &Rc<()>, value: Value) {
        let mut entries = self.0.weak_entries.borrow_mut();
        entries.retain(|e| e.map.strong_count() > 0);
        if let Some(entry) = entries
            .iter_mut()
            .find(|e| core::ptr::eq(e.map.as_ptr(), Rc::as_ptr(map)))
        {
            entry.value = value;
            return;
        }
        entries.push(WeakEntry {
            map: Rc::downgrade(map),
            value,
        });
    }

    pub(crate) fn weak_remove(&self, map: &Rc<()>) -> bool {
        let mut entries = self.0.weak_entries.borrow_mut();
        let before = entries.len();
        entries.retain(|e| {
            e.map.strong_count() > 0 && !core::ptr::eq(e.map.as_ptr(), Rc::as_ptr(map))
        });
        entries.len() < before
    }

    pub(crate) fn strong_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub(crate) fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0).cast()
    }

    /// Report every reference this object holds: property values, the
    /// delegate and the values of weak map entries keyed by it. Entries of
    /// dropped maps are only reported with `stale_entries`.
    ///
    /// Returns false without visiting anything if the object is being
    /// modified.
    pub(crate) fn try_trace(&self, stale_entries: bool, visit: &mut dyn FnMut(Edge<'_>)) -> bool {
        let (Ok(properties), Ok(delegate), Ok(entries)) = (
            self.0.properties.try_borrow(),
            self.0.delegate.try_borrow(),
            self.0.weak_entries.try_borrow(),
        ) else {
            return false;
        };
        for property in properties.iter() {
            if let Some(edge) = Edge::of_value(&property.descriptor.value) {
                visit(edge);
            }
        }
        if let Some(delegate) = delegate.as_ref() {
            visit(Edge::Object(delegate));
        }
        for entry in entries.iter() {
            if !stale_entries && entry.map.strong_count() == 0 {
                continue;
            }
            if let Some(edge) = Edge::of_value(&entry.value) {
                visit(edge);
            }
        }
        true
    }

    /// Drop every reference this object holds.
    pub(crate) fn clear(&self) {
        let properties = self.0.properties.try_borrow_mut().map(|mut p| core::mem::take(&mut *p));
        let delegate = self.0.delegate.try_borrow_mut().map(|mut d| d.take());
        let entries = self.0.weak_entries.try_borrow_mut().map(|mut e| core::mem::take(&mut *e));
        drop((properties, delegate, entries));
    }

    /// Downgrade to a handle that does not keep the object alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef(Rc::downgrade(&self.0))
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({})", self.0.id)
    }
}

/// Non-owning object handle.
#[derive(Clone)]
pub struct WeakObjectRef(Weak<ObjectCell>);

impl WeakObjectRef {
    /// The object, if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.0.upgrade().map(ObjectRef)
    }

    /// Returns true if the object has been reclaimed.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.0.strong_count() == 0
    }
}

impl fmt::Debug for WeakObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(object) => write!(f, "WeakObjectRef({})", object.id()),
            None => write!(f, "WeakObjectRef(<dead>)"),
        }
    }
}
