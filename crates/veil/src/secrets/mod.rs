// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Namespace factory.
//!
//! A [`Secrets`] factory registers its backends once, against one realm,
//! and then hands out any number of isolated namespaces. Each namespace is
//! represented only by its [`Coupler`]: whoever holds the coupler can reach
//! the namespace's records, nobody else can.


use core::fmt;
use std::rc::Rc;

use veil_host::{ObjectRef, Realm, Value};
use veil_ident::IdentifierGenerator;

use crate::config::{SecretsConfig, StorageKind};
use crate::error::SecretError;
use crate::record::CompanionRecord;
use crate::resolver::MirrorResolver;
use crate::store::{HiddenSlotBackend, IdentityStore, NamespaceId, NativeWeakBackend, StoreFactory};

/// Factory of private namespaces.
pub struct Secrets {
    realm: Rc<Realm>,
    generator: IdentifierGenerator,
    backends: Vec<Box<dyn StoreFactory>>,
    storage: StorageKind,
    /// Namespaces created so far.
    created: u64,
}

impl Secrets {
    /// Create a factory for `realm` with environment-backed identifiers.
    ///
    /// # Errors
    ///
    /// - `EnvironmentUnsupported` if the realm has no reflection hooks
    /// - `ConfigurationError` if the configured backend is unavailable
    pub fn new(realm: Rc<Realm>, config: SecretsConfig) -> Result<Self, SecretError> {
        Self::with_generator(realm, config, IdentifierGenerator::new())
    }

    /// Create a factory with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `EnvironmentUnsupported` if the realm has no reflection hooks.
    pub fn with_defaults(realm: Rc<Realm>) -> Result<Self, SecretError> {
        Self::new(realm, SecretsConfig::default())
    }

    /// Create a factory minting identifiers from `generator`.
    ///
    /// # Errors
    ///
    /// Same as [`Secrets::new`].
    pub fn with_generator(
        realm: Rc<Realm>,
        config: SecretsConfig,
        mut generator: IdentifierGenerator,
    ) -> Result<Self, SecretError> {
        if !generator.is_environment_backed() {
            tracing::debug!("no environment entropy, identifiers use a seeded source");
        }
        let mut backends: Vec<Box<dyn StoreFactory>> = vec![Box::new(HiddenSlotBackend::new(
            Rc::clone(&realm),
            &mut generator,
        )?)];
        if realm.capabilities().weak_maps {
            backends.push(Box::new(NativeWeakBackend::new(Rc::clone(&realm))?));
        }

        let mut secrets = Self {
            realm,
            generator,
            backends,
            storage: StorageKind::default(),
            created: 0,
        };
        secrets.configure(config.storage)?;
        Ok(secrets)
    }

    /// Select the backend for namespaces created from now on.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the backend is unavailable in this
    /// realm. The previous selection stays in effect.
    pub fn configure(&mut self, storage: StorageKind) -> Result<(), SecretError> {
        if self.backend(storage).is_none() {
            return Err(SecretError::ConfigurationError {
                requested: storage.to_string(),
            });
        }
        self.storage = storage;
        tracing::debug!(storage = %storage, "storage configured");
        Ok(())
    }

    /// Select the backend by name.
    ///
    /// Accepts `HiddenSlot` and `NativeWeak`, and the legacy names
    /// `WeakKeyedStore` and `WeakMap`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` naming `name` if it is unknown or the
    /// backend is unavailable.
    pub fn configure_storage(&mut self, name: &str) -> Result<(), SecretError> {
        let storage: StorageKind = name.parse()?;
        self.configure(storage)
            .map_err(|_| SecretError::ConfigurationError {
                requested: name.to_owned(),
            })
    }

    /// The backend new namespaces use.
    #[must_use]
    pub const fn storage(&self) -> StorageKind {
        self.storage
    }

    /// The realm this factory serves.
    #[must_use]
    pub const fn realm(&self) -> &Rc<Realm> {
        &self.realm
    }

    /// Number of namespaces created so far.
    #[must_use]
    pub const fn created(&self) -> u64 {
        self.created
    }

    /// Create a new namespace.
    ///
    /// # Errors
    ///
    /// Propagates backend failures creating the namespace's store.
    pub fn create(&mut self) -> Result<Coupler, SecretError> {
        let storage = self.storage;
        let namespace = NamespaceId::new(self.generator.identifier());
        let store = self
            .backend(storage)
            .ok_or_else(|| SecretError::ConfigurationError {
                requested: storage.to_string(),
            })?
            .create_store(namespace)?;

        self.created += 1;
        tracing::debug!(namespace = self.created, storage = %storage, "namespace created");
        Ok(Coupler {
            realm: Rc::clone(&self.realm),
            store,
            storage,
            serial: self.created,
        })
    }

    fn backend(&self, storage: StorageKind) -> Option<&dyn StoreFactory> {
        self.backends
            .iter()
            .find(|backend| backend.kind() == storage)
            .map(|backend| &**backend)
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("storage", &self.storage)
            .field("created", &self.created)
            .finish_non_exhaustive()
    }
}

/// Accessor of one namespace.
///
/// Calling it with an object returns that object's record in the namespace.
/// The namespace id never appears in the accessor's textual forms.
pub struct Coupler {
    realm: Rc<Realm>,
    store: Box<dyn IdentityStore>,
    storage: StorageKind,
    serial: u64,
}

impl Coupler {
    /// The record of `target` in this namespace.
    ///
    /// Repeated calls return the same record as long as the delegate of
    /// `target` and its ancestors stay unchanged.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `target` is not an object
    /// - `UnsupportedObject` if `target` is non-extensible and the backend
    ///   has nothing attached to it yet
    /// - `TamperDetected` if the backend's integrity check fails
    pub fn call(&self, target: &Value) -> Result<CompanionRecord, SecretError> {
        MirrorResolver::new(&self.realm, self.store.as_ref(), self.serial).resolve(target)
    }

    /// The record of `object` in this namespace.
    ///
    /// # Errors
    ///
    /// Same as [`Coupler::call`], minus `InvalidArgument`.
    pub fn of(&self, object: &ObjectRef) -> Result<CompanionRecord, SecretError> {
        self.call(&Value::from(object))
    }

    /// The backend holding this namespace's records.
    #[must_use]
    pub const fn storage(&self) -> StorageKind {
        self.storage
    }
}

impl fmt::Debug for Coupler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretCoupler(object)")
    }
}

impl fmt::Display for Coupler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretCoupler(object)")
    }
}
