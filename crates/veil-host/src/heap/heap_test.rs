// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for cycle collection.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::realm::Realm;

fn pair(realm: &Realm) -> (ObjectRef, ObjectRef) {
    let a = realm.create_object(None);
    let b = realm.create_object(None);
    a.set("other", &b).unwrap();
    b.set("other", &a).unwrap();
    (a, b)
}

// --- Property cycles ---

#[test]
fn unreachable_cycle_is_reclaimed() {
    let realm = Realm::default();
    let (a, b) = pair(&realm);
    let watch = (a.downgrade(), b.downgrade());
    drop((a, b));
    assert!(!watch.0.is_dead());

    assert_eq!(realm.collect_cycles(), 2);
    assert!(watch.0.is_dead());
    assert!(watch.1.is_dead());
    assert_eq!(realm.live_objects(), 0);
}

#[test]
fn held_cycle_survives() {
    let realm = Realm::default();
    let (a, b) = pair(&realm);
    let watch = b.downgrade();
    drop(b);

    assert_eq!(realm.collect_cycles(), 0);
    let b = watch.upgrade().unwrap();
    assert_eq!(a.get("other"), Value::from(&b));
    assert_eq!(b.get("other"), Value::from(&a));
}

#[test]
fn object_reached_through_a_delegate_survives() {
    let realm = Realm::default();
    let base = realm.create_object(None);
    let child = realm.create_object(Some(&base));
    base.set("child", &child).unwrap();
    let watch = base.downgrade();
    drop(base);

    assert_eq!(realm.collect_cycles(), 0);
    assert_eq!(child.get("child"), Value::from(&child));
    assert!(!watch.is_dead());
}

// --- Weak map entries ---

#[test]
fn entry_referring_to_its_key_is_reclaimed() {
    let realm = Realm::default();
    let map = realm.weak_map().unwrap();
    let key = realm.create_object(None);
    let value = realm.create_object(None);
    value.set("owner", &key).unwrap();
    map.set(&key, Value::from(&value));
    let watch = (key.downgrade(), value.downgrade());
    drop((key, value));

    assert_eq!(realm.collect_cycles(), 2);
    assert!(watch.0.is_dead());
    assert!(watch.1.is_dead());
}

#[test]
fn entry_of_a_live_key_survives() {
    let realm = Realm::default();
    let map = realm.weak_map().unwrap();
    let key = realm.create_object(None);
    let value = realm.create_object(None);
    value.set("owner", &key).unwrap();
    map.set(&key, Value::from(&value));
    drop(value);

    assert_eq!(realm.collect_cycles(), 0);
    let value = map.get(&key).unwrap();
    assert_eq!(value.as_object().unwrap().get("owner"), Value::from(&key));
}

#[test]
fn entry_of_a_dropped_map_does_not_keep_its_cycle() {
    let realm = Realm::default();
    let map = realm.weak_map().unwrap();
    let key = realm.create_object(None);
    let value = realm.create_object(None);
    value.set("owner", &key).unwrap();
    map.set(&key, Value::from(&value));
    let watch = key.downgrade();
    drop((map, key, value));

    assert_eq!(realm.collect_cycles(), 2);
    assert!(watch.is_dead());
}

// --- Functions ---

#[test]
fn bound_function_cycle_is_reclaimed() {
    let realm = Realm::default();
    let object = realm.create_object(None);
    let target = realm.create_object(None);
    target.set("back", &object).unwrap();
    let function = HostFunction::bound("f", target, |target, _| Ok(target.get("back")));
    object.set("f", function).unwrap();
    let watch = object.downgrade();
    drop(object);

    assert_eq!(realm.collect_cycles(), 2);
    assert!(watch.is_dead());
}

#[test]
fn held_function_keeps_its_target() {
    let realm = Realm::default();
    let object = realm.create_object(None);
    let target = realm.create_object(None);
    target.set("back", &object).unwrap();
    let function = HostFunction::bound("f", target, |target, _| Ok(target.get("back")));
    object.set("f", function.clone()).unwrap();
    let watch = object.downgrade();
    drop(object);

    assert_eq!(realm.collect_cycles(), 0);
    let object = watch.upgrade().unwrap();
    assert_eq!(function.call(&[]).unwrap(), Value::from(&object));
}

#[test]
fn opaque_closure_captures_are_kept() {
    let realm = Realm::default();
    let object = realm.create_object(None);
    let captured = object.clone();
    object
        .set("f", HostFunction::new("f", move |_| Ok(Value::from(&captured))))
        .unwrap();
    let watch = object.downgrade();
    drop(object);

    assert_eq!(realm.collect_cycles(), 0);
    assert!(!watch.is_dead());
}

// --- Scheduling ---

#[test]
fn collection_runs_once_enough_objects_were_created() {
    let realm = Realm::default();
    let (a, b) = pair(&realm);
    let watch = a.downgrade();
    drop((a, b));

    for _ in 0..COLLECTION_THRESHOLD {
        drop(realm.create_object(None));
    }
    assert!(watch.is_dead());
}
