// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Shared infrastructure for Veil's end-to-end tests.
//!
//! This crate provides:
//! - [`TestHost`] - a realm plus a namespace factory with reproducible
//!   identifiers
//! - [`listings`] - every enumeration entry point of a realm, for
//!   concealment checks
//! - [`init_tracing`] - log output routed to the test harness
//!
//! The tests themselves live in `tests/` and only use the public API.

use core::sync::atomic::{AtomicU64, Ordering};
use std::rc::Rc;

use tracing_subscriber::EnvFilter;
use veil::{Coupler, SecretError, Secrets, SecretsConfig, StorageKind};
use veil_host::{Capabilities, ObjectRef, PropertyDescriptor, PropertyKey, Realm};
use veil_ident::{Entropy, IdentifierGenerator};

/// Seed of the next test host's identifier generator.
///
/// Hosts sharing a realm must not mint the same marker keys.
static NEXT_SEED: AtomicU64 = AtomicU64::new(0x5EC2_E75);

/// Route `tracing` output to the test harness.
///
/// Honors `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    // Another test may have installed the subscriber already
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A realm together with a namespace factory.
///
/// Each test should create its own host.
pub struct TestHost {
    realm: Rc<Realm>,
    secrets: Secrets,
}

impl TestHost {
    /// Fully capable host with the default storage.
    ///
    /// # Errors
    ///
    /// Propagates factory initialization failures.
    pub fn new() -> Result<Self, SecretError> {
        Self::with(Capabilities::default(), StorageKind::default())
    }

    /// Host with explicit capabilities and storage.
    ///
    /// # Errors
    ///
    /// Propagates factory initialization failures.
    pub fn with(capabilities: Capabilities, storage: StorageKind) -> Result<Self, SecretError> {
        Self::in_realm(Rc::new(Realm::new(capabilities)), storage)
    }

    /// Host around an existing realm, for tests that prepare the realm
    /// before any backend is registered.
    ///
    /// # Errors
    ///
    /// Propagates factory initialization failures.
    pub fn in_realm(realm: Rc<Realm>, storage: StorageKind) -> Result<Self, SecretError> {
        init_tracing();
        let secrets = Secrets::with_generator(
            Rc::clone(&realm),
            SecretsConfig::default().with_storage(storage),
            IdentifierGenerator::with_entropy(Entropy::seeded(
                NEXT_SEED.fetch_add(1, Ordering::Relaxed),
            )),
        )?;
        Ok(Self { realm, secrets })
    }

    /// The host realm.
    #[must_use]
    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    /// The namespace factory.
    pub const fn secrets(&mut self) -> &mut Secrets {
        &mut self.secrets
    }

    /// Create a namespace.
    ///
    /// # Errors
    ///
    /// Propagates namespace creation failures.
    pub fn namespace(&mut self) -> Result<Coupler, SecretError> {
        self.secrets.create()
    }

    /// New object without a delegate.
    #[must_use]
    pub fn object(&self) -> ObjectRef {
        self.realm.create_object(None)
    }

    /// New object delegating to `parent`.
    #[must_use]
    pub fn child_of(&self, parent: &ObjectRef) -> ObjectRef {
        self.realm.create_object(Some(parent))
    }

    /// `len` objects, each delegating to the previous one.
    #[must_use]
    pub fn chain(&self, len: usize) -> Vec<ObjectRef> {
        let mut chain: Vec<ObjectRef> = Vec::with_capacity(len);
        for _ in 0..len {
            let object = self.realm.create_object(chain.last());
            chain.push(object);
        }
        chain
    }
}

/// The keys each of the realm's enumeration entry points reports for
/// `object`, descriptor listings reduced to their keys.
#[must_use]
pub fn listings(realm: &Realm, object: &ObjectRef) -> Vec<Vec<PropertyKey>> {
    vec![
        realm.own_keys(object),
        realm.enumerable_keys(object),
        realm.all_keys(object),
        keys_of(realm.own_property_descriptors(object)),
        keys_of(realm.all_property_descriptors(object)),
    ]
}

fn keys_of(descriptors: Vec<(PropertyKey, PropertyDescriptor)>) -> Vec<PropertyKey> {
    descriptors.into_iter().map(|(key, _)| key).collect()
}
