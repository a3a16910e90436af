// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Records never outlive their objects.

// Test code prioritizes clarity over defensive programming
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, missing_docs)]

use veil::StorageKind;
use veil_host::{Capabilities, Value};
use veil_spec_tests::TestHost;

#[test]
fn record_dies_with_its_object() {
    for storage in StorageKind::ALL {
        let mut host = TestHost::with(Capabilities::default(), storage).unwrap();
        let coupler = host.namespace().unwrap();
        let object = host.object();
        let watch = coupler.of(&object).unwrap().as_object().downgrade();

        assert!(!watch.is_dead());
        drop(object);
        assert!(watch.is_dead());
    }
}

#[test]
fn parent_record_lives_while_a_child_needs_it() {
    for storage in StorageKind::ALL {
        let mut host = TestHost::with(Capabilities::default(), storage).unwrap();
        let coupler = host.namespace().unwrap();
        let base = host.object();
        let child = host.child_of(&base);
        let parent_record = coupler.of(&base).unwrap().as_object().downgrade();
        coupler.of(&child).unwrap();

        drop(base);
        // The child still delegates to the base
        assert!(!parent_record.is_dead());
        drop(child);
        assert!(parent_record.is_dead());
    }
}

#[test]
fn dropped_namespace_records_die_with_the_object() {
    for storage in StorageKind::ALL {
        let mut host = TestHost::with(Capabilities::default(), storage).unwrap();
        let object = host.object();
        let watch = {
            let coupler = host.namespace().unwrap();
            coupler.of(&object).unwrap().as_object().downgrade()
        };
        host.namespace().unwrap().of(&object).unwrap();

        drop(object);
        assert!(watch.is_dead());
    }
}

#[test]
fn native_weak_releases_dropped_namespaces_on_next_write() {
    let mut host = TestHost::with(Capabilities::default(), StorageKind::NativeWeak).unwrap();
    let object = host.object();
    let watch = {
        let coupler = host.namespace().unwrap();
        coupler.of(&object).unwrap().as_object().downgrade()
    };
    assert!(!watch.is_dead());

    host.namespace().unwrap().of(&object).unwrap();
    assert!(watch.is_dead());
}

// ============================================================================
// Records referring back to their object
// ============================================================================

#[test]
fn record_referring_to_its_object_is_reclaimed() {
    for storage in StorageKind::ALL {
        let mut host = TestHost::with(Capabilities::default(), storage).unwrap();
        let coupler = host.namespace().unwrap();
        let object = host.object();
        let record = coupler.of(&object).unwrap();
        record.set("owner", &object).unwrap();
        let watch = (object.downgrade(), record.as_object().downgrade());
        drop((record, object));

        // Only the object and its record keep each other alive now
        assert!(!watch.1.is_dead());
        assert!(host.realm().collect_cycles() > 0);
        assert!(watch.0.is_dead(), "{storage}: object kept alive");
        assert!(watch.1.is_dead(), "{storage}: record kept alive");
    }
}

#[test]
fn record_of_a_live_object_survives_collection() {
    for storage in StorageKind::ALL {
        let mut host = TestHost::with(Capabilities::default(), storage).unwrap();
        let coupler = host.namespace().unwrap();
        let base = host.object();
        let object = host.child_of(&base);
        let record = coupler.of(&object).unwrap();
        record.set("owner", &object).unwrap();
        coupler.of(&base).unwrap().set("x", 1).unwrap();
        drop((record, base));

        host.realm().collect_cycles();
        let record = coupler.of(&object).unwrap();
        assert_eq!(record.get("owner"), Value::from(&object));
        assert_eq!(record.get("x"), Value::Int(1));
    }
}

#[test]
fn unrelated_namespaces_keep_their_records_through_collection() {
    let mut host = TestHost::new().unwrap();
    let first = host.namespace().unwrap();
    let second = host.namespace().unwrap();
    let kept = host.object();
    let dropped = host.object();
    first.of(&kept).unwrap().set("owner", &kept).unwrap();
    second.of(&dropped).unwrap().set("owner", &dropped).unwrap();
    let watch = dropped.downgrade();
    drop(dropped);

    host.realm().collect_cycles();
    assert!(watch.is_dead());
    assert_eq!(first.of(&kept).unwrap().get("owner"), Value::from(&kept));
    assert!(!second.of(&kept).unwrap().has("owner"));
}
