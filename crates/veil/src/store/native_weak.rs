// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Native weak map backend.

use std::rc::Rc;

use veil_host::{Realm, Value, WeakMap};

use super::{IdentityStore, NamespaceId, StoreFactory, expect_object};
use crate::config::StorageKind;
use crate::error::SecretError;
use crate::record::CompanionRecord;

/// Backend giving each namespace its own host weak map.
pub struct NativeWeakBackend {
    realm: Rc<Realm>,
}

impl NativeWeakBackend {
    /// Create the backend.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the realm has no weak maps.
    pub fn new(realm: Rc<Realm>) -> Result<Self, SecretError> {
        if !realm.capabilities().weak_maps {
            return Err(SecretError::ConfigurationError {
                requested: StorageKind::NativeWeak.to_string(),
            });
        }
        Ok(Self { realm })
    }
}

impl StoreFactory for NativeWeakBackend {
    fn kind(&self) -> StorageKind {
        StorageKind::NativeWeak
    }

    fn create_store(&self, _namespace: NamespaceId) -> Result<Box<dyn IdentityStore>, SecretError> {
        let map = self.realm.weak_map()?;
        Ok(Box::new(NativeWeakStore { map }))
    }
}

struct NativeWeakStore {
    map: WeakMap,
}

impl IdentityStore for NativeWeakStore {
    fn get(&self, target: &Value) -> Result<Option<CompanionRecord>, SecretError> {
        let object = expect_object(target)?;
        Ok(self
            .map
            .get(object)
            .and_then(|value| value.as_object().cloned())
            .map(CompanionRecord::new))
    }

    fn set(&self, target: &Value, record: CompanionRecord) -> Result<CompanionRecord, SecretError> {
        let object = expect_object(target)?;
        self.map.set(object, Value::from(record.as_object()));
        Ok(record)
    }
}
