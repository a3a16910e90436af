// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Hidden slots stay hidden and refuse illegitimate access.

// Test code prioritizes clarity over defensive programming
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, missing_docs)]

use core::cell::RefCell;
use std::rc::Rc;

use veil::{SecretError, StorageKind};
use veil_host::{HostError, ObjectRef, PropertyKey, Realm, ReflectionGuard, Value};
use veil_spec_tests::{TestHost, listings};

/// Guard that conceals nothing and remembers every key it was asked about.
///
/// Installed ahead of the factory, it sees the marker key the way an
/// embedder-level observer would.
#[derive(Default)]
struct Spy {
    seen: RefCell<Vec<PropertyKey>>,
}

impl ReflectionGuard for Spy {
    fn conceals(&self, key: &PropertyKey) -> bool {
        self.seen.borrow_mut().push(key.clone());
        false
    }

    fn before_seal(&self, _realm: &Realm, _object: &ObjectRef) -> Result<(), HostError> {
        Ok(())
    }
}

fn spied_host() -> (TestHost, Rc<Spy>) {
    let realm = Rc::new(Realm::default());
    let spy = Rc::new(Spy::default());
    realm.install_guard(Rc::clone(&spy) as Rc<dyn ReflectionGuard>).unwrap();
    (TestHost::in_realm(realm, StorageKind::HiddenSlot).unwrap(), spy)
}

/// The marker key on `object`, as observed by `spy`.
fn observed_marker(host: &TestHost, spy: &Spy, object: &ObjectRef) -> PropertyKey {
    spy.seen.borrow_mut().clear();
    let _ = host.realm().own_keys(object);
    spy.seen
        .borrow()
        .iter()
        .find(|key| key.as_str().starts_with("||:"))
        .cloned()
        .unwrap()
}

// ============================================================================
// Marker invisibility
// ============================================================================

#[test]
fn marker_never_listed() {
    let mut host = TestHost::new().unwrap();
    let coupler = host.namespace().unwrap();
    let base = host.object();
    base.set("inherited", 1).unwrap();
    let object = host.child_of(&base);
    object.set("own", 1).unwrap();

    coupler.of(&object).unwrap();
    for keys in listings(host.realm(), &object) {
        assert!(keys.iter().all(|key| !key.as_str().starts_with("||:")));
    }
    assert_eq!(host.realm().own_keys(&object), [PropertyKey::new("own")]);
    assert_eq!(
        host.realm().all_keys(&object),
        [PropertyKey::new("own"), PropertyKey::new("inherited")]
    );
}

#[test]
fn marker_hidden_after_freezing() {
    let mut host = TestHost::new().unwrap();
    let coupler = host.namespace().unwrap();
    let object = host.object();
    host.realm().freeze(&object).unwrap();

    coupler.of(&object).unwrap().set("x", 1).unwrap();
    for keys in listings(host.realm(), &object) {
        assert!(keys.is_empty());
    }
    assert!(host.realm().is_frozen(&object));
}

#[test]
fn factories_sharing_a_realm_hide_both_markers() {
    let realm = Rc::new(Realm::default());
    let mut first = TestHost::in_realm(Rc::clone(&realm), StorageKind::HiddenSlot).unwrap();
    let mut second = TestHost::in_realm(Rc::clone(&realm), StorageKind::HiddenSlot).unwrap();
    let a = first.namespace().unwrap();
    let b = second.namespace().unwrap();

    let object = first.object();
    a.of(&object).unwrap().set("x", 1).unwrap();
    b.of(&object).unwrap().set("x", 2).unwrap();
    for keys in listings(&realm, &object) {
        assert!(keys.is_empty());
    }
    assert_eq!(a.of(&object).unwrap().get("x"), Value::Int(1));
}

#[test]
fn native_weak_leaves_nothing_to_hide() {
    let mut host = TestHost::with(Default::default(), StorageKind::NativeWeak).unwrap();
    let coupler = host.namespace().unwrap();
    let object = host.object();
    coupler.of(&object).unwrap().set("x", 1).unwrap();
    for keys in listings(host.realm(), &object) {
        assert!(keys.is_empty());
    }
}

// ============================================================================
// Tamper detection
// ============================================================================

#[test]
fn calling_the_capability_directly_is_detected() {
    let (mut host, spy) = spied_host();
    let coupler = host.namespace().unwrap();
    let object = host.object();
    coupler.of(&object).unwrap().set("x", 1).unwrap();

    let marker = observed_marker(&host, &spy, &object);
    let slot = object.get(marker.as_str());
    let Value::Function(capability) = slot else {
        panic!("slot does not hold a function");
    };
    assert!(capability.call(&[]).is_err());

    assert_eq!(coupler.of(&object), Err(SecretError::TamperDetected));
    assert_eq!(coupler.of(&host.object()), Err(SecretError::TamperDetected));
    // New namespaces of the same factory are compromised as well
    let fresh = host.namespace().unwrap();
    assert_eq!(fresh.of(&host.object()), Err(SecretError::TamperDetected));
}

#[test]
fn forged_slot_is_detected() {
    let (mut host, spy) = spied_host();
    let coupler = host.namespace().unwrap();
    let sample = host.object();
    coupler.of(&sample).unwrap();
    let marker = observed_marker(&host, &spy, &sample);

    let victim = host.object();
    victim.set(&marker, "not a capability").unwrap();
    assert_eq!(coupler.of(&victim), Err(SecretError::TamperDetected));
}

#[test]
fn tamper_does_not_leak_other_factories() {
    let (mut host, spy) = spied_host();
    let coupler = host.namespace().unwrap();
    let object = host.object();
    coupler.of(&object).unwrap();

    let marker = observed_marker(&host, &spy, &object);
    if let Value::Function(capability) = object.get(marker.as_str()) {
        assert!(capability.call(&[]).is_err());
    }

    let mut healthy = TestHost::new().unwrap();
    let unaffected = healthy.namespace().unwrap();
    assert!(unaffected.of(&healthy.object()).is_ok());
}
